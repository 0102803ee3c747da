//! ## Overview
//! A decimal stack machine is a bounded-resource, arbitrary-precision
//! decimal virtual machine built to run one thing: small pricing and
//! ranking rules compiled to a compact textual bytecode called DSMAL. It
//! is deliberately not Turing-complete — every program executes in a
//! fixed-size value arena under an instruction budget, so a host
//! embedding this crate can run untrusted or user-authored scoring rules
//! without worrying about runaway loops or unbounded memory growth.
//!
//! ## Architecture
//! A [`Program`] is the immutable, shareable, compiled form of one DSMAL
//! string: a variable name table, a constant pool, and a decoded
//! instruction stream. A [`Machine`] is a mutable execution instance
//! bound to exactly one `Program` — it owns the operand stack, the
//! current and baseline variable banks, and a fixed-capacity [`arena`]
//! of decimal values collected with mark-and-sweep. Many `Machine`s can
//! share one `Arc<Program>`.
//!
//! Every live value the machine touches — on the stack, in a variable
//! slot, in the constants table — is a [`value::ValueRef`]: either one of
//! the 19 process-global interned small integers, a slot in the
//! program's constant pool, or a cell in the machine's own arena. This
//! three-way split is what keeps constants and small integers immune to
//! garbage collection while only transient arithmetic results pay for
//! arena bookkeeping.
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use dsm::{Machine, Program, VarInput};
//!
//! let program = Arc::new(Program::parse("x|y;3.14;Lv0CpMlLc0MlSt1Xx").unwrap());
//! let mut baseline = HashMap::new();
//! baseline.insert("x".to_string(), VarInput::Int(2));
//! let mut machine = Machine::new(program, &baseline).unwrap();
//! machine.run().unwrap();
//! assert_eq!(machine.get("y").unwrap(), "12.56");
//! ```
//!
//! ## Copyright Information
//! Copyright 2026 Kerosene2000.
//! Licensed under the terms of the GNU General Public License, version 3
//! or (at your option) any later version.

pub mod arena;
pub mod coverage;
pub mod error;
mod machine;
pub mod opcode;
pub mod parser;
pub mod program;
pub mod random;
pub mod value;

pub use coverage::CoverageReport;
pub use error::{Error, ExecutionError, ProgramError};
pub use machine::{Machine, StepOutcome, VarInput, DEFAULT_INSTRUCTION_LIMIT, STACK_SIZE};
pub use opcode::{Instruction, Opcode};
pub use program::Program;
pub use random::RandomSource;
