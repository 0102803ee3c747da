//! The mutable execution instance bound to one [`Program`]
//! (spec.md §3 "Machine", §4.3 "Interpreter", §4.4 "Coverage Mode",
//! §6 "Host API").

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::arena::Arena;
use crate::coverage::CoverageReport;
use crate::error::{Error, ExecutionError};
use crate::opcode::{Instruction, Opcode};
use crate::program::Program;
use crate::random::RandomSource;
use crate::value::{self, Value, ValueRef};

pub const STACK_SIZE: usize = 32;
pub const DEFAULT_INSTRUCTION_LIMIT: usize = 10_000;

/// A value supplied by the host for a variable read or write
/// (spec.md §6: "value may be a boolean... integer, decimal, or
/// decimal-parsable string").
#[derive(Debug, Clone, PartialEq)]
pub enum VarInput {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Str(String),
}

impl VarInput {
    fn to_decimal(&self) -> Result<Decimal, Error> {
        match self {
            VarInput::Bool(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
            VarInput::Int(n) => Ok(Decimal::from(*n)),
            VarInput::Decimal(d) => Ok(*d),
            VarInput::Str(s) => s
                .trim()
                .parse::<Decimal>()
                .map_err(|_| Error::ValueError(s.clone())),
        }
    }
}

/// The outcome of a single dispatch tick, for callers that want to single
/// step (the `dsmdbg` binary; see spec.md §4.3 for full-run semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted,
}

enum PcUpdate {
    Next,
    Jump(usize),
    Halt,
}

/// A mutable execution instance bound to exactly one [`Program`].
pub struct Machine {
    program: Arc<Program>,
    current: Vec<ValueRef>,
    baseline: Vec<ValueRef>,
    stack: Vec<ValueRef>,
    arena: Arena,
    instruction_limit: usize,
    random_source: Option<RandomSource>,
    pc: usize,
    executed: usize,
}

impl Machine {
    /// Construct a `Machine` bound to `program`, applying `baseline` as
    /// the initial (and baseline) value of each named variable. Unknown
    /// names fail `KeyError`; unparsable values fail `ValueError`
    /// (spec.md §6 `machine_new`).
    pub fn new(
        program: Arc<Program>,
        baseline: &HashMap<String, VarInput>,
    ) -> Result<Machine, Error> {
        let n = program.variable_count();
        let mut machine = Machine {
            program,
            current: vec![ValueRef::Interned(0); n],
            baseline: vec![ValueRef::Interned(0); n],
            stack: Vec::with_capacity(STACK_SIZE),
            arena: Arena::new(),
            instruction_limit: DEFAULT_INSTRUCTION_LIMIT,
            random_source: None,
            pc: 0,
            executed: 0,
        };

        for (name, input) in baseline {
            let slot = machine
                .program
                .variable_slot(name)
                .ok_or_else(|| Error::KeyError(name.clone()))? as usize;
            let decimal = input.to_decimal()?;
            let value_ref = machine
                .allocate_result(decimal, &[])
                .map_err(|kind| Error::Execution {
                    pc: 0,
                    opcode: "machine_new",
                    kind,
                })?;
            machine.current[slot] = value_ref;
            machine.baseline[slot] = value_ref;
        }

        Ok(machine)
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn instruction_limit(&self) -> usize {
        self.instruction_limit
    }

    pub fn set_instruction_limit(&mut self, limit: usize) {
        self.instruction_limit = limit;
    }

    pub fn set_random_source(&mut self, source: impl Iterator<Item = Decimal> + 'static) {
        self.random_source = Some(RandomSource::new(source));
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn instructions_executed(&self) -> usize {
        self.executed
    }

    /// The canonical decimal string form of variable `name`
    /// (spec.md §6 "Variable string form").
    pub fn get(&self, name: &str) -> Result<Cow<'_, str>, Error> {
        let slot = self
            .program
            .variable_slot(name)
            .ok_or_else(|| Error::KeyError(name.to_string()))? as usize;
        let text = match self.current[slot] {
            ValueRef::Arena(index) => value::cell_canonical_string(self.arena.get(index)).to_string(),
            other => value::canonical_string(&self.resolve(other)),
        };
        Ok(Cow::Owned(text))
    }

    /// Assign `name`'s *current* slot (the baseline is untouched; see
    /// [`Machine::reset`]).
    pub fn set(&mut self, name: &str, input: VarInput) -> Result<(), Error> {
        let slot = self
            .program
            .variable_slot(name)
            .ok_or_else(|| Error::KeyError(name.to_string()))? as usize;
        let decimal = input.to_decimal()?;
        let value_ref = self
            .allocate_result(decimal, &[])
            .map_err(|kind| Error::Execution {
                pc: self.pc,
                opcode: "St",
                kind,
            })?;
        self.current[slot] = value_ref;
        Ok(())
    }

    /// Restore every current slot to its baseline value, then apply
    /// `overrides` (spec.md §6 `machine.reset`).
    pub fn reset(&mut self, overrides: &HashMap<String, VarInput>) -> Result<(), Error> {
        self.current.clone_from(&self.baseline);
        for (name, input) in overrides {
            self.set(name, input.clone())?;
        }
        Ok(())
    }

    /// Run the program to completion from instruction 0, returning the
    /// number of instructions executed (spec.md §6 `machine.run`).
    pub fn run(&mut self) -> Result<usize, Error> {
        self.begin_run();
        loop {
            if self.step_inner(None)? == StepOutcome::Halted {
                break;
            }
        }
        Ok(self.executed)
    }

    /// Like [`Machine::run`], but also records which instructions were
    /// dispatched (spec.md §4.4).
    pub fn run_with_coverage(&mut self) -> Result<(usize, CoverageReport), Error> {
        self.begin_run();
        let mut bits = vec![false; self.program.instructions().len()];
        loop {
            if self.step_inner(Some(&mut bits))? == StepOutcome::Halted {
                break;
            }
        }
        Ok((self.executed, CoverageReport::new(bits)))
    }

    /// Reset `pc`/`executed` and clear the stack, as every `run` does
    /// before executing its first instruction. Exposed so `dsmdbg` can
    /// start a fresh single-stepped run.
    pub fn begin_run(&mut self) {
        self.pc = 0;
        self.executed = 0;
        self.stack.clear();
    }

    /// Execute exactly one instruction, starting from wherever `pc`
    /// currently is (see [`Machine::begin_run`]). For interactive
    /// stepping only; [`Machine::run`] drives this internally.
    pub fn step(&mut self) -> Result<StepOutcome, Error> {
        self.step_inner(None)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn stack_strings(&self) -> Vec<String> {
        self.stack
            .iter()
            .map(|&r| value::canonical_string(&self.resolve(r)))
            .collect()
    }

    fn step_inner(&mut self, mut coverage: Option<&mut [bool]>) -> Result<StepOutcome, Error> {
        let instructions = Arc::clone(&self.program);
        let instructions = instructions.instructions();

        if self.pc >= instructions.len() {
            self.stack.clear();
            return Err(Error::Execution {
                pc: self.pc,
                opcode: "",
                kind: ExecutionError::OutOfBounds,
            });
        }

        let instr = instructions[self.pc];
        let mnemonic = instr.opcode.mnemonic();

        if self.executed >= self.instruction_limit {
            self.stack.clear();
            return Err(Error::InstructionLimitExceeded {
                pc: self.pc,
                opcode: mnemonic,
            });
        }

        let required = instr.opcode.operands_required();
        if self.stack.len() < required {
            self.stack.clear();
            return Err(Error::Execution {
                pc: self.pc,
                opcode: mnemonic,
                kind: ExecutionError::StackUnderflow,
            });
        }

        self.executed += 1;
        if let Some(bits) = coverage.as_deref_mut() {
            bits[self.pc] = true;
        }
        trace!(pc = self.pc, opcode = mnemonic, depth = self.stack.len(), "dispatch");

        match self.execute(instr) {
            Ok(PcUpdate::Next) => {
                self.pc += 1;
                Ok(StepOutcome::Continue)
            }
            Ok(PcUpdate::Jump(target)) => {
                self.pc = target;
                Ok(StepOutcome::Continue)
            }
            Ok(PcUpdate::Halt) => {
                self.stack.clear();
                Ok(StepOutcome::Halted)
            }
            Err(kind) => {
                warn!(pc = self.pc, opcode = mnemonic, ?kind, "execution failed");
                self.stack.clear();
                Err(Error::Execution {
                    pc: self.pc,
                    opcode: mnemonic,
                    kind,
                })
            }
        }
    }

    fn execute(&mut self, instr: Instruction) -> Result<PcUpdate, ExecutionError> {
        use Opcode::*;

        match instr.opcode {
            Exit => Ok(PcUpdate::Halt),

            JumpUnconditional => Ok(PcUpdate::Jump(instr.param as usize)),

            JumpIfNonzero => {
                let a = self.pop();
                if !self.resolve(a).is_zero() {
                    Ok(PcUpdate::Jump(instr.param as usize))
                } else {
                    Ok(PcUpdate::Next)
                }
            }

            JumpIfZero => {
                let a = self.pop();
                if self.resolve(a).is_zero() {
                    Ok(PcUpdate::Jump(instr.param as usize))
                } else {
                    Ok(PcUpdate::Next)
                }
            }

            LoadConstant => {
                let idx = instr.param;
                if idx as usize >= self.program.constants().len() {
                    return Err(ExecutionError::InvalidParameter);
                }
                self.push(ValueRef::Constant(idx))?;
                Ok(PcUpdate::Next)
            }

            LoadVariable => {
                let idx = instr.param as usize;
                if idx >= self.current.len() {
                    return Err(ExecutionError::InvalidParameter);
                }
                self.push(self.current[idx])?;
                Ok(PcUpdate::Next)
            }

            LoadRandom => {
                let sample = match self.random_source.as_mut() {
                    Some(source) => source.next_value().ok_or(ExecutionError::Random)?,
                    None => return Err(ExecutionError::Random),
                };
                let result = self.allocate_result(sample, &[])?;
                self.push(result)?;
                Ok(PcUpdate::Next)
            }

            LoadZero => {
                self.push(ValueRef::Interned(0))?;
                Ok(PcUpdate::Next)
            }

            LoadOne => {
                self.push(ValueRef::Interned(1))?;
                Ok(PcUpdate::Next)
            }

            SetVariable => {
                let idx = instr.param as usize;
                if idx >= self.current.len() {
                    return Err(ExecutionError::InvalidParameter);
                }
                let a = self.pop();
                self.current[idx] = a;
                Ok(PcUpdate::Next)
            }

            Copy => {
                let top = *self
                    .stack
                    .last()
                    .expect("pre-dispatch guarantees at least one operand");
                self.push(top)?;
                Ok(PcUpdate::Next)
            }

            Pop => {
                self.pop();
                Ok(PcUpdate::Next)
            }

            Not => {
                let a = self.pop();
                let result = if self.resolve(a).is_zero() {
                    ValueRef::Interned(1)
                } else {
                    ValueRef::Interned(0)
                };
                self.push(result)?;
                Ok(PcUpdate::Next)
            }

            Negate => {
                let a = self.pop();
                let result = self.negate(a)?;
                self.push(result)?;
                Ok(PcUpdate::Next)
            }

            Absolute => {
                let a = self.pop();
                let v = self.resolve(a);
                let non_negative = match v.fast {
                    Some(n) => n >= 0,
                    None => !v.decimal.is_sign_negative(),
                };
                let result = if non_negative { a } else { self.negate(a)? };
                self.push(result)?;
                Ok(PcUpdate::Next)
            }

            Ceiling | Floor | Round => {
                let a = self.pop();
                let result = self.round_like(a, instr.opcode)?;
                self.push(result)?;
                Ok(PcUpdate::Next)
            }

            Equal | NotEqual | GreaterThan | GreaterThanOrEqual => {
                let b = self.pop();
                let a = self.pop();
                let ordering = self.cmp_values(a, b);
                let truth = match instr.opcode {
                    Equal => ordering == Ordering::Equal,
                    NotEqual => ordering != Ordering::Equal,
                    GreaterThan => ordering == Ordering::Greater,
                    GreaterThanOrEqual => ordering != Ordering::Less,
                    _ => unreachable!(),
                };
                self.push(if truth {
                    ValueRef::Interned(1)
                } else {
                    ValueRef::Interned(0)
                })?;
                Ok(PcUpdate::Next)
            }

            Add | Sub | Mul | Div | Pow => {
                let result = self.arithmetic(instr.opcode)?;
                self.push(result)?;
                Ok(PcUpdate::Next)
            }

            Min | Max => {
                let result = self.min_max(instr.opcode == Min)?;
                self.push(result)?;
                Ok(PcUpdate::Next)
            }
        }
    }

    fn push(&mut self, value: ValueRef) -> Result<(), ExecutionError> {
        if self.stack.len() >= STACK_SIZE {
            return Err(ExecutionError::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> ValueRef {
        self.stack
            .pop()
            .expect("pre-dispatch guarantees enough operands")
    }

    fn resolve(&self, r: ValueRef) -> Value {
        match r {
            ValueRef::Interned(n) => *value::interned_digits().get(n),
            ValueRef::Constant(idx) => {
                let decimal = self.program.constants()[idx as usize];
                Value {
                    decimal,
                    fast: value::fast_path_of(&decimal),
                }
            }
            ValueRef::Arena(idx) => Value::from(self.arena.get(idx)),
        }
    }

    fn cmp_values(&self, a: ValueRef, b: ValueRef) -> Ordering {
        self.resolve(a).decimal.cmp(&self.resolve(b).decimal)
    }

    /// Same cell identity, or both fast-path integers with equal value —
    /// the narrow notion of "obviously equal" spec.md §4.3 requires for
    /// the `a − a = 0` / `a / a = 1` short circuits, deliberately not
    /// substituting a full decimal equality comparison.
    fn obviously_equal(&self, a: ValueRef, va: Value, b: ValueRef, vb: Value) -> bool {
        a == b || (va.fast.is_some() && va.fast == vb.fast)
    }

    fn is_one(&self, v: Value) -> bool {
        v.decimal == Decimal::ONE
    }

    fn is_two(&self, v: Value) -> bool {
        v.decimal == Decimal::from(2)
    }

    /// Canonicalize `decimal`, then either return an interned digit or
    /// allocate a fresh arena cell. `extra` names operands the caller has
    /// already popped off the stack but still needs kept alive across the
    /// allocation (spec.md §4.2 rule 3c, §9 "Mark-sweep across one
    /// procedure").
    fn allocate_result(
        &mut self,
        decimal: Decimal,
        extra: &[ValueRef],
    ) -> Result<ValueRef, ExecutionError> {
        let canonical = value::canonicalize(decimal);
        if let Some(fast) = value::fast_path_of(&canonical) {
            if let Some(interned) = value::interned_ref(fast) {
                return Ok(interned);
            }
        }
        let roots = gc_roots(&self.stack, &self.current, &self.baseline, extra);
        let index = self.arena.allocate(canonical, roots)?;
        Ok(ValueRef::Arena(index))
    }

    fn negate(&mut self, a: ValueRef) -> Result<ValueRef, ExecutionError> {
        let v = self.resolve(a);
        if let Some(n) = v.fast {
            if let Some(negated) = n.checked_neg() {
                if let Some(interned) = value::interned_ref(negated) {
                    return Ok(interned);
                }
                return self.allocate_result(Decimal::from(negated), &[a]);
            }
        }
        self.allocate_result(-v.decimal, &[a])
    }

    fn round_like(&mut self, a: ValueRef, op: Opcode) -> Result<ValueRef, ExecutionError> {
        let v = self.resolve(a);
        if v.is_integer() {
            return Ok(a);
        }
        let rounded = match op {
            Opcode::Ceiling => v.decimal.ceil(),
            Opcode::Floor => v.decimal.floor(),
            Opcode::Round => v
                .decimal
                .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven),
            _ => unreachable!("round_like is only called for Ceiling/Floor/Round"),
        };
        self.allocate_result(rounded, &[a])
    }

    fn min_max(&mut self, is_min: bool) -> Result<ValueRef, ExecutionError> {
        let b = self.pop();
        let a = self.pop();
        let ordering = self.cmp_values(a, b);
        // Ties, and the branch that favors the second operand, both pick
        // `b` (spec.md §4.3 "Min / Max", §9 "Tie-breaks").
        let winner = match (is_min, ordering) {
            (_, Ordering::Equal) => b,
            (true, Ordering::Less) => a,
            (true, Ordering::Greater) => b,
            (false, Ordering::Less) => b,
            (false, Ordering::Greater) => a,
        };
        Ok(winner)
    }

    fn arithmetic(&mut self, op: Opcode) -> Result<ValueRef, ExecutionError> {
        let b = self.pop();
        let a = self.pop();
        let va = self.resolve(a);
        let vb = self.resolve(b);

        match op {
            Opcode::Add => {
                if vb.is_zero() {
                    return Ok(a);
                }
                if va.is_zero() {
                    return Ok(b);
                }
                let sum = va
                    .decimal
                    .checked_add(vb.decimal)
                    .ok_or(ExecutionError::Overflow)?;
                self.allocate_result(sum, &[a, b])
            }

            Opcode::Sub => {
                if vb.is_zero() {
                    return Ok(a);
                }
                if self.obviously_equal(a, va, b, vb) {
                    return Ok(ValueRef::Interned(0));
                }
                if va.is_zero() {
                    return self.negate(b);
                }
                let difference = va
                    .decimal
                    .checked_sub(vb.decimal)
                    .ok_or(ExecutionError::Overflow)?;
                self.allocate_result(difference, &[a, b])
            }

            Opcode::Mul => {
                if va.is_zero() || vb.is_zero() {
                    return Ok(ValueRef::Interned(0));
                }
                if self.is_one(va) {
                    return Ok(b);
                }
                if self.is_one(vb) {
                    return Ok(a);
                }
                let product = va
                    .decimal
                    .checked_mul(vb.decimal)
                    .ok_or(ExecutionError::Overflow)?;
                self.allocate_result(product, &[a, b])
            }

            Opcode::Div => {
                if vb.is_zero() {
                    return Err(ExecutionError::DivisionByZero);
                }
                if self.is_one(vb) {
                    return Ok(a);
                }
                if va.is_zero() {
                    return Ok(ValueRef::Interned(0));
                }
                if self.obviously_equal(a, va, b, vb) {
                    return Ok(ValueRef::Interned(1));
                }
                let quotient = va
                    .decimal
                    .checked_div(vb.decimal)
                    .ok_or(ExecutionError::Overflow)?;
                self.allocate_result(quotient, &[a, b])
            }

            Opcode::Pow => {
                if self.is_one(vb) {
                    return Ok(a);
                }
                if self.is_two(vb) {
                    let squared = va
                        .decimal
                        .checked_mul(va.decimal)
                        .ok_or(ExecutionError::Overflow)?;
                    return self.allocate_result(squared, &[a]);
                }
                if vb.is_zero() {
                    return Ok(if va.is_zero() {
                        ValueRef::Interned(0)
                    } else {
                        ValueRef::Interned(1)
                    });
                }
                if self.is_one(va) {
                    return Ok(ValueRef::Interned(1));
                }
                if va.is_zero() && vb.decimal.is_sign_negative() {
                    return Err(ExecutionError::InvalidPower);
                }
                let power = compute_pow(va.decimal, vb).ok_or(ExecutionError::Overflow)?;
                self.allocate_result(power, &[a, b])
            }

            _ => unreachable!("arithmetic is only called for Add/Sub/Mul/Div/Pow"),
        }
    }
}

/// Gather every arena index currently reachable from the operand stack,
/// both variable banks, and whatever extra operands the caller has
/// already popped but still needs (spec.md §4.2 rule 3).
fn gc_roots<'a>(
    stack: &'a [ValueRef],
    current: &'a [ValueRef],
    baseline: &'a [ValueRef],
    extra: &'a [ValueRef],
) -> impl Iterator<Item = usize> + Clone + 'a {
    stack
        .iter()
        .chain(current.iter())
        .chain(baseline.iter())
        .chain(extra.iter())
        .filter_map(|r| match r {
            ValueRef::Arena(index) => Some(*index),
            _ => None,
        })
}

fn compute_pow(base: Decimal, exponent: Value) -> Option<Decimal> {
    use rust_decimal::MathematicalOps;

    if let Some(exp) = exponent.fast {
        return base.checked_powi(exp as i64);
    }
    if exponent.decimal.fract().is_zero() {
        if let Ok(exp) = i64::try_from(exponent.decimal.mantissa()) {
            return base.checked_powi(exp);
        }
    }
    base.checked_powd(exponent.decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_source(source: &str) -> Machine {
        let program = Arc::new(Program::parse(source).unwrap());
        Machine::new(program, &HashMap::new()).unwrap()
    }

    #[test]
    fn scenario_minimal_exit() {
        let mut machine = run_source(";;Xx");
        assert_eq!(machine.run().unwrap(), 1);
        assert_eq!(machine.program().variable_count(), 0);
    }

    #[test]
    fn scenario_pricing_formula() {
        let program = Arc::new(Program::parse("x|y;3.14;Lv0CpMlLc0MlSt1Xx").unwrap());
        let mut baseline = HashMap::new();
        baseline.insert("x".to_string(), VarInput::Int(2));
        let mut machine = Machine::new(program, &baseline).unwrap();
        let executed = machine.run().unwrap();
        assert_eq!(executed, 7);
        assert_eq!(machine.get("y").unwrap(), "12.56");
    }

    #[test]
    fn scenario_division_by_zero_reports_location() {
        let mut machine = run_source(";;LoLzDvXx");
        let err = machine.run().unwrap_err();
        match err {
            Error::Execution { opcode, kind, .. } => {
                assert_eq!(opcode, "Dv");
                assert_eq!(kind, ExecutionError::DivisionByZero);
            }
            other => panic!("expected Execution error, got {other:?}"),
        }
    }

    #[test]
    fn scenario_pc_runs_past_last_instruction() {
        let mut machine = run_source("p;;Lv0Lz");
        let err = machine.run().unwrap_err();
        assert!(matches!(
            err,
            Error::Execution {
                kind: ExecutionError::OutOfBounds,
                ..
            }
        ));
    }

    #[test]
    fn scenario_instruction_limit() {
        // Loop forever (Ju0) so the instruction limit is what stops it.
        let mut machine = run_source(";;Ju0");
        machine.set_instruction_limit(3);
        let err = machine.run().unwrap_err();
        assert!(matches!(
            err,
            Error::InstructionLimitExceeded { pc: 0, opcode: "Ju" }
        ));
        assert_eq!(machine.instructions_executed(), 3);
    }

    #[test]
    fn reset_restores_baseline_and_overrides() {
        let program = Arc::new(Program::parse(&"x;;Lz St0 Xx".replace(' ', "")).unwrap());
        let mut baseline = HashMap::new();
        baseline.insert("x".to_string(), VarInput::Int(5));
        let mut machine = Machine::new(program, &baseline).unwrap();
        machine.set("x", VarInput::Int(99)).unwrap();
        assert_eq!(machine.get("x").unwrap(), "99");

        machine.reset(&HashMap::new()).unwrap();
        assert_eq!(machine.get("x").unwrap(), "5");

        let mut overrides = HashMap::new();
        overrides.insert("x".to_string(), VarInput::Int(7));
        machine.reset(&overrides).unwrap();
        assert_eq!(machine.get("x").unwrap(), "7");
    }

    #[test]
    fn reset_is_idempotent() {
        let mut machine = run_source("x;;LoSt0Xx");
        machine.run().unwrap();
        machine.reset(&HashMap::new()).unwrap();
        let after_first = machine.get("x").unwrap().into_owned();
        machine.reset(&HashMap::new()).unwrap();
        let after_second = machine.get("x").unwrap().into_owned();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn division_of_identical_cell_is_one_without_dividing() {
        // Lv0 Lv0 Dv: load the same variable twice, divide — obviously
        // equal by cell identity, must short circuit to 1 even though the
        // value itself is never compared for decimal equality.
        let program = Arc::new(Program::parse("x;;Lv0Lv0DvSt0Xx").unwrap());
        let mut baseline = HashMap::new();
        baseline.insert("x".to_string(), VarInput::Decimal(Decimal::from(7)));
        let mut machine = Machine::new(program, &baseline).unwrap();
        machine.run().unwrap();
        assert_eq!(machine.get("x").unwrap(), "1");
    }

    #[test]
    fn min_max_tie_break_prefers_second_operand() {
        // Lo Lo Mn: push 1, push 1, Min of equal values pushes b.
        let mut machine = run_source("x;;LoLoMnSt0Xx");
        machine.run().unwrap();
        assert_eq!(machine.get("x").unwrap(), "1");
    }

    #[test]
    fn absolute_leaves_non_negative_untouched() {
        let mut machine = run_source("x;;LoAbSt0Xx");
        machine.run().unwrap();
        assert_eq!(machine.get("x").unwrap(), "1");
    }

    #[test]
    fn stack_overflow_is_reported() {
        let source = format!("x;;{}Xx", "Lo".repeat(STACK_SIZE + 1));
        let mut machine = run_source(&source);
        let err = machine.run().unwrap_err();
        assert!(matches!(
            err,
            Error::Execution {
                kind: ExecutionError::StackOverflow,
                ..
            }
        ));
    }
}
