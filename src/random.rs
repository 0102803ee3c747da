//! The random-number interface (spec.md §6, §9 "Random source
//! resolution").
//!
//! A `Machine`'s random source is type-erased: any `Iterator<Item =
//! Decimal>` the host provides works, whether it's backed by a PRNG, a
//! fixture list for deterministic tests, or anything else. Random sources
//! and host-language bindings for setting/retrieving variable values are
//! explicitly out of scope for this crate (spec.md §1) beyond this
//! interface — the VM only ever calls `next()` on whatever it's handed.

use rust_decimal::Decimal;

/// A type-erased, stateful producer of decimals for the `Lr` opcode.
///
/// Resolution is lazy and single-shot per machine: setting a source just
/// stores the iterator; the first `Lr` executed pulls the first value,
/// and every subsequent `Lr` (in this run or a later one) advances the
/// same iterator, matching spec.md §9's "capture once... then reuse".
pub struct RandomSource {
    inner: Box<dyn Iterator<Item = Decimal>>,
}

impl RandomSource {
    pub fn new(iter: impl Iterator<Item = Decimal> + 'static) -> RandomSource {
        RandomSource {
            inner: Box::new(iter),
        }
    }

    pub fn next_value(&mut self) -> Option<Decimal> {
        self.inner.next()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_values_in_order() {
        let mut source = RandomSource::new([Decimal::from(1), Decimal::from(2)].into_iter());
        assert_eq!(source.next_value(), Some(Decimal::from(1)));
        assert_eq!(source.next_value(), Some(Decimal::from(2)));
        assert_eq!(source.next_value(), None);
    }
}
