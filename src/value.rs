//! Decimal values and interned digits (spec.md §3 "Decimal Value",
//! "Interned digits").
//!
//! A live value anywhere in the machine — on the stack, in a variable
//! slot, in the constants table — is a [`ValueRef`]: a small, `Copy`
//! discriminated reference to where the actual decimal payload lives. The
//! payload itself (decimal, fast-path integer, mark bit, cached string) is
//! an [`ArenaCell`], owned exclusively by the [`crate::arena::Arena`] of
//! one [`crate::Machine`]; interned digits and program constants are never
//! arena-resident, which is what makes them safe to share across threads
//! and immune to the collector.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use rust_decimal::Decimal;

/// A reference to a live decimal value: either one of the 19 interned
/// small integers, a slot in a [`crate::Program`]'s constants table, or a
/// cell in this machine's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRef {
    Interned(i8),
    Constant(u16),
    Arena(usize),
}

/// The payload of one arena cell.
///
/// `fast` is populated whenever the decimal is integral and fits in an
/// `i32`; several opcodes short-circuit on it without touching `decimal`
/// at all (spec.md §3, "integer fast-path").
#[derive(Debug)]
pub struct ArenaCell {
    pub decimal: Decimal,
    pub fast: Option<i32>,
    pub marked: bool,
    pub cached_string: RefCell<Option<Rc<str>>>,
}

impl ArenaCell {
    pub fn new(decimal: Decimal) -> ArenaCell {
        let decimal = canonicalize(decimal);
        ArenaCell {
            fast: fast_path_of(&decimal),
            decimal,
            marked: false,
            cached_string: RefCell::new(None),
        }
    }

    /// Overwrite this cell in place, as the allocator does when handing out
    /// a recycled free-list cell (spec.md §4.2, rule 2: "clearing any
    /// cached string").
    pub fn reinitialize(&mut self, decimal: Decimal) {
        let decimal = canonicalize(decimal);
        self.fast = fast_path_of(&decimal);
        self.decimal = decimal;
        self.marked = false;
        *self.cached_string.borrow_mut() = None;
    }
}

/// A resolved, read-only decimal value. Produced by dereferencing a
/// [`ValueRef`] against a machine; cheap to pass by value since the
/// `i32` fast-path is inline and the decimal is `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    pub decimal: Decimal,
    pub fast: Option<i32>,
}

impl Value {
    pub fn is_zero(&self) -> bool {
        self.decimal.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.fast.is_some() || self.decimal.fract().is_zero()
    }
}

impl From<&ArenaCell> for Value {
    fn from(cell: &ArenaCell) -> Value {
        Value {
            decimal: cell.decimal,
            fast: cell.fast,
        }
    }
}

/// Strip trailing fractional zeros and normalize `-0` to `0`
/// (spec.md §3 invariants, §4.3 "Result reduction").
pub fn canonicalize(d: Decimal) -> Decimal {
    let mut d = d.normalize();
    if d.is_zero() && d.is_sign_negative() {
        d.set_sign_positive(true);
    }
    d
}

/// Populate the fast-path field: `Some(n)` when `d` is an integer that
/// fits in `i32`, else `None`.
pub fn fast_path_of(d: &Decimal) -> Option<i32> {
    if d.scale() != 0 {
        return None;
    }
    // `Decimal::scale() == 0` guarantees an exact integer mantissa; try to
    // narrow it to i32 without going through a lossy f64 round trip.
    i32::try_from(d.mantissa()).ok().filter(|n| Decimal::from(*n) == *d)
}

/// The canonical decimal string form (spec.md §6 "Variable string form"):
/// `"0"` for zero, no trailing fractional zeros, no scientific notation.
pub fn canonical_string(v: &Value) -> String {
    if let Some(n) = v.fast {
        return n.to_string();
    }
    let d = canonicalize(v.decimal);
    d.to_string()
}

/// Same as [`canonical_string`], but for an arena-resident cell: reuses
/// the cell's cached string across repeated reads of an unchanged
/// variable, populating it on first access (spec.md §3 "cached string
/// form"). [`ArenaCell::reinitialize`] clears the cache whenever the
/// allocator recycles the cell, so a stale string can never leak through.
pub fn cell_canonical_string(cell: &ArenaCell) -> Rc<str> {
    if let Some(cached) = cell.cached_string.borrow().as_ref() {
        return Rc::clone(cached);
    }
    let string: Rc<str> = Rc::from(canonical_string(&Value::from(cell)));
    *cell.cached_string.borrow_mut() = Some(Rc::clone(&string));
    string
}

const INTERNED_MIN: i8 = -9;
const INTERNED_MAX: i8 = 9;

/// The 19 process-global interned digits −9..=9 (spec.md §3 "Interned
/// digits"). Always marked, never touched by any collector, safe to share
/// across threads since they are read-only once built.
pub struct InternedDigits {
    cells: [Value; (INTERNED_MAX - INTERNED_MIN + 1) as usize],
}

impl InternedDigits {
    pub fn get(&self, n: i8) -> &Value {
        debug_assert!((INTERNED_MIN..=INTERNED_MAX).contains(&n));
        &self.cells[(n - INTERNED_MIN) as usize]
    }
}

static INTERNED: OnceLock<InternedDigits> = OnceLock::new();

pub fn interned_digits() -> &'static InternedDigits {
    INTERNED.get_or_init(|| {
        let mut cells = Vec::with_capacity((INTERNED_MAX - INTERNED_MIN + 1) as usize);
        for n in INTERNED_MIN..=INTERNED_MAX {
            cells.push(Value {
                decimal: Decimal::from(n),
                fast: Some(n as i32),
            });
        }
        InternedDigits {
            cells: cells.try_into().expect("19 interned digits"),
        }
    })
}

/// `ValueRef` for the interned digit `n`, if `n` is within −9..=9.
pub fn interned_ref(n: i32) -> Option<ValueRef> {
    if (INTERNED_MIN as i32..=INTERNED_MAX as i32).contains(&n) {
        Some(ValueRef::Interned(n as i8))
    } else {
        None
    }
}
