//! The DSMAL opcode table (spec.md §6 "Opcode table").
//!
//! Each opcode is a two-letter mnemonic: one uppercase ASCII letter
//! followed by one lowercase ASCII letter. A handful take a `u16`
//! parameter; the rest don't. This mirrors the way the teacher's
//! `instruction` module keeps one small, exhaustively `match`-able enum at
//! the center of both the parser and the interpreter.

use std::fmt;

/// One decoded DSMAL instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub param: u16,
}

/// All opcodes the interpreter understands, named after their mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Exit,
    JumpUnconditional,
    JumpIfNonzero,
    JumpIfZero,
    LoadConstant,
    LoadVariable,
    LoadRandom,
    LoadZero,
    LoadOne,
    SetVariable,
    Copy,
    Pop,
    Not,
    Negate,
    Absolute,
    Ceiling,
    Floor,
    Round,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Min,
    Max,
}

impl Opcode {
    /// The two-letter mnemonic used in DSMAL source and in error messages
    /// (spec.md §6 "Error object shape").
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Exit => "Xx",
            Opcode::JumpUnconditional => "Ju",
            Opcode::JumpIfNonzero => "Jn",
            Opcode::JumpIfZero => "Jz",
            Opcode::LoadConstant => "Lc",
            Opcode::LoadVariable => "Lv",
            Opcode::LoadRandom => "Lr",
            Opcode::LoadZero => "Lz",
            Opcode::LoadOne => "Lo",
            Opcode::SetVariable => "St",
            Opcode::Copy => "Cp",
            Opcode::Pop => "Pp",
            Opcode::Not => "Nt",
            Opcode::Negate => "Ng",
            Opcode::Absolute => "Ab",
            Opcode::Ceiling => "Cl",
            Opcode::Floor => "Fl",
            Opcode::Round => "Rd",
            Opcode::Equal => "Eq",
            Opcode::NotEqual => "Ne",
            Opcode::GreaterThan => "Gt",
            Opcode::GreaterThanOrEqual => "Ge",
            Opcode::Add => "Ad",
            Opcode::Sub => "Sb",
            Opcode::Mul => "Ml",
            Opcode::Div => "Dv",
            Opcode::Pow => "Pw",
            Opcode::Min => "Mn",
            Opcode::Max => "Mx",
        }
    }

    /// Look up an opcode by its two-letter mnemonic.
    pub fn from_mnemonic(letters: &str) -> Option<Opcode> {
        Some(match letters {
            "Xx" => Opcode::Exit,
            "Ju" => Opcode::JumpUnconditional,
            "Jn" => Opcode::JumpIfNonzero,
            "Jz" => Opcode::JumpIfZero,
            "Lc" => Opcode::LoadConstant,
            "Lv" => Opcode::LoadVariable,
            "Lr" => Opcode::LoadRandom,
            "Lz" => Opcode::LoadZero,
            "Lo" => Opcode::LoadOne,
            "St" => Opcode::SetVariable,
            "Cp" => Opcode::Copy,
            "Pp" => Opcode::Pop,
            "Nt" => Opcode::Not,
            "Ng" => Opcode::Negate,
            "Ab" => Opcode::Absolute,
            "Cl" => Opcode::Ceiling,
            "Fl" => Opcode::Floor,
            "Rd" => Opcode::Round,
            "Eq" => Opcode::Equal,
            "Ne" => Opcode::NotEqual,
            "Gt" => Opcode::GreaterThan,
            "Ge" => Opcode::GreaterThanOrEqual,
            "Ad" => Opcode::Add,
            "Sb" => Opcode::Sub,
            "Ml" => Opcode::Mul,
            "Dv" => Opcode::Div,
            "Pw" => Opcode::Pow,
            "Mn" => Opcode::Min,
            "Mx" => Opcode::Max,
            _ => return None,
        })
    }

    /// Whether this opcode is followed by a `u16` parameter in DSMAL text.
    pub fn takes_param(self) -> bool {
        matches!(
            self,
            Opcode::JumpUnconditional
                | Opcode::JumpIfNonzero
                | Opcode::JumpIfZero
                | Opcode::LoadConstant
                | Opcode::LoadVariable
                | Opcode::SetVariable
        )
    }

    /// Number of operands this opcode pops off the stack before executing
    /// (spec.md §4.3 "Pre-dispatch checks").
    pub fn operands_required(self) -> usize {
        match self {
            Opcode::Exit
            | Opcode::JumpUnconditional
            | Opcode::LoadConstant
            | Opcode::LoadVariable
            | Opcode::LoadRandom
            | Opcode::LoadZero
            | Opcode::LoadOne => 0,

            Opcode::JumpIfNonzero
            | Opcode::JumpIfZero
            | Opcode::SetVariable
            | Opcode::Copy
            | Opcode::Pop
            | Opcode::Not
            | Opcode::Negate
            | Opcode::Absolute
            | Opcode::Ceiling
            | Opcode::Floor
            | Opcode::Round => 1,

            Opcode::Equal
            | Opcode::NotEqual
            | Opcode::GreaterThan
            | Opcode::GreaterThanOrEqual
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Pow
            | Opcode::Min
            | Opcode::Max => 2,
        }
    }

    /// Net stack depth change (pushes minus pops) caused by this opcode.
    pub fn stack_delta(self) -> i32 {
        match self {
            Opcode::Exit | Opcode::JumpUnconditional => 0,
            Opcode::JumpIfNonzero | Opcode::JumpIfZero => -1,
            Opcode::LoadConstant
            | Opcode::LoadVariable
            | Opcode::LoadRandom
            | Opcode::LoadZero
            | Opcode::LoadOne => 1,
            Opcode::SetVariable | Opcode::Pop => -1,
            Opcode::Copy => 1,
            Opcode::Not | Opcode::Negate | Opcode::Absolute | Opcode::Ceiling | Opcode::Floor
            | Opcode::Round => 0,
            Opcode::Equal
            | Opcode::NotEqual
            | Opcode::GreaterThan
            | Opcode::GreaterThanOrEqual
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Pow
            | Opcode::Min
            | Opcode::Max => -1,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.opcode.takes_param() {
            write!(f, "{}{}", self.opcode, self.param)
        } else {
            write!(f, "{}", self.opcode)
        }
    }
}
