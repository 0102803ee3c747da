//! End-to-end scenarios exercising `Program` + `Machine` together, one
//! per named situation a host embedding this crate would hit.

use std::collections::HashMap;
use std::sync::Arc;

use dsm::{Error, ExecutionError, Machine, Program, VarInput};

#[test]
fn pricing_rule_applies_tax_then_doubles_then_adds_fee() {
    // Lv0 Cp Ml Lc0 Ml St1 Xx: y = x * x * 3.14
    let program = Arc::new(Program::parse("x|y;3.14;Lv0CpMlLc0MlSt1Xx").unwrap());
    let mut baseline = HashMap::new();
    baseline.insert("x".to_string(), VarInput::Decimal("2.5".parse().unwrap()));
    let mut machine = Machine::new(program, &baseline).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.get("y").unwrap(), "19.625");
}

#[test]
fn ranking_rule_picks_the_larger_of_two_scores() {
    let program = Arc::new(Program::parse("a|b|winner;;Lv0Lv1MxSt2Xx").unwrap());
    let mut baseline = HashMap::new();
    baseline.insert("a".to_string(), VarInput::Int(3));
    baseline.insert("b".to_string(), VarInput::Int(7));
    let mut machine = Machine::new(program, &baseline).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.get("winner").unwrap(), "7");
}

#[test]
fn conditional_discount_branches_on_threshold() {
    // if total > 100, subtract a flat 10 discount; otherwise leave it alone.
    let source = "total|discounted;100|10;Lv0Lc0GtJn7Lv0St1Ju11Lv0Lc1SbSt1Xx";
    let program = Arc::new(Program::parse(source).unwrap());

    let mut above = HashMap::new();
    above.insert("total".to_string(), VarInput::Int(150));
    let mut machine = Machine::new(Arc::clone(&program), &above).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.get("discounted").unwrap(), "140");

    let mut below = HashMap::new();
    below.insert("total".to_string(), VarInput::Int(50));
    let mut machine = Machine::new(program, &below).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.get("discounted").unwrap(), "50");
}

#[test]
fn division_by_zero_reports_exact_instruction() {
    let program = Arc::new(Program::parse(";;LoLzDvXx").unwrap());
    let mut machine = Machine::new(program, &HashMap::new()).unwrap();
    let err = machine.run().unwrap_err();
    assert_eq!(err.location(), Some((2, "Dv")));
    assert!(matches!(
        err,
        Error::Execution {
            kind: ExecutionError::DivisionByZero,
            ..
        }
    ));
}

#[test]
fn runaway_loop_is_stopped_by_the_instruction_limit() {
    let program = Arc::new(Program::parse(";;Ju0").unwrap());
    let mut machine = Machine::new(program, &HashMap::new()).unwrap();
    machine.set_instruction_limit(50);
    let err = machine.run().unwrap_err();
    assert!(matches!(err, Error::InstructionLimitExceeded { .. }));
    assert_eq!(machine.instructions_executed(), 50);
}

#[test]
fn coverage_tracks_the_untaken_branch() {
    let source = "x;;Lv0Jz5LoSt0Ju7LzSt0Xx";
    let program = Arc::new(Program::parse(source).unwrap());
    let mut taken = HashMap::new();
    taken.insert("x".to_string(), VarInput::Int(1));
    let mut machine = Machine::new(program, &taken).unwrap();
    let (_, coverage) = machine.run_with_coverage().unwrap();
    assert!(!coverage.is_fully_covered());
    assert!(coverage.uncovered().count() > 0);
}

#[test]
fn host_can_override_baseline_per_invocation_without_reparsing() {
    let program = Arc::new(Program::parse("x|y;;Lv0Lv0AdSt1Xx").unwrap());
    let mut baseline = HashMap::new();
    baseline.insert("x".to_string(), VarInput::Int(4));
    let mut machine = Machine::new(program, &baseline).unwrap();

    machine.run().unwrap();
    assert_eq!(machine.get("y").unwrap(), "8");

    let mut overrides = HashMap::new();
    overrides.insert("x".to_string(), VarInput::Int(10));
    machine.reset(&overrides).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.get("y").unwrap(), "20");
}

#[test]
fn repeated_overwrites_reclaim_arena_space_via_sweep() {
    // Negate a non-integer value in place 300 times: each iteration's
    // result overwrites the only live reference to the previous one, so
    // the arena (capacity 256) must sweep and recycle cells to survive
    // past the 256th allocation.
    let source = "x|n;1.5|300|1;Lc0St0Lc1St1Lv0NgSt0Lv1Lc2SbSt1Lv1Jn4Xx";
    let program = Arc::new(Program::parse(source).unwrap());
    let mut machine = Machine::new(program, &HashMap::new()).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.get("x").unwrap(), "1.5");
}

#[test]
fn more_than_256_live_transients_exhausts_the_arena() {
    let count = 300;
    let vars = (0..count).map(|i| format!("v{i}")).collect::<Vec<_>>().join("|");
    let consts = (0..count).map(|i| format!("{i}.5")).collect::<Vec<_>>().join("|");
    let code: String = (0..count).map(|i| format!("Lc{i}NgSt{i}")).collect::<String>() + "Xx";
    let source = format!("{vars};{consts};{code}");

    let program = Arc::new(Program::parse(&source).unwrap());
    let mut machine = Machine::new(program, &HashMap::new()).unwrap();
    let err = machine.run().unwrap_err();
    assert!(matches!(
        err,
        Error::Execution {
            kind: ExecutionError::OutOfSpace,
            ..
        }
    ));
}
