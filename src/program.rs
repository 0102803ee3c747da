//! The immutable, shareable compiled form of one DSMAL string
//! (spec.md §3 "Program", §4.1 "DSMAL Parser").

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::error::ProgramError;
use crate::opcode::Instruction;
use crate::parser::{parse_instruction, split_entries, split_sections};

/// Hard per-section limits shared by variables, constants, and
/// instructions (spec.md §3).
pub const MAX_TABLE_SIZE: usize = u16::MAX as usize;

/// A parsed, immutable DSMAL program: its variable name table, its
/// constant pool, and its decoded instruction stream.
///
/// Cheap to share: construct once behind an `Arc` and hand it to as many
/// [`crate::Machine`]s as needed (spec.md §5 "Sharing").
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    variables: Vec<String>,
    variable_index: HashMap<String, u16>,
    constants: Vec<Decimal>,
    instructions: Vec<Instruction>,
}

impl Program {
    /// Parse a DSMAL string (`VARS;CONSTS;CODE`) into a `Program`
    /// (`program_load` in spec.md §6).
    pub fn parse(source: &str) -> Result<Program, ProgramError> {
        let (vars_section, consts_section, code_section) = split_sections(source)?;

        let (variables, variable_index) = parse_variables(vars_section)?;
        let constants = parse_constants(consts_section)?;
        let instructions = parse_code(code_section, constants.len(), variables.len())?;

        Ok(Program {
            source: source.to_string(),
            variables,
            variable_index,
            constants,
            instructions,
        })
    }

    /// The original DSMAL text this program was parsed from
    /// (`program_serialize` in spec.md §6 — a byte-exact round trip,
    /// since spec.md §3 specifies `source` is "retained for
    /// serialization").
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// The zero-based slot of `name`, if it is one of this program's
    /// variables.
    pub fn variable_slot(&self, name: &str) -> Option<u16> {
        self.variable_index.get(name).copied()
    }

    pub fn constants(&self) -> &[Decimal] {
        &self.constants
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_variables(section: &str) -> Result<(Vec<String>, HashMap<String, u16>), ProgramError> {
    let entries = split_entries(section);
    if entries.len() > MAX_TABLE_SIZE {
        return Err(ProgramError::TooManyVariables {
            count: entries.len(),
        });
    }

    let mut variables = Vec::with_capacity(entries.len());
    let mut index = HashMap::with_capacity(entries.len());
    for (i, name) in entries.into_iter().enumerate() {
        if name.is_empty() {
            return Err(ProgramError::EmptyVariableName { index: i });
        }
        if index.contains_key(name) {
            return Err(ProgramError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        index.insert(name.to_string(), i as u16);
        variables.push(name.to_string());
    }
    Ok((variables, index))
}

fn parse_constants(section: &str) -> Result<Vec<Decimal>, ProgramError> {
    let entries = split_entries(section);
    if entries.len() > MAX_TABLE_SIZE {
        return Err(ProgramError::TooManyConstants {
            count: entries.len(),
        });
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            parse_decimal_literal(text).ok_or_else(|| ProgramError::InvalidConstant {
                index: i,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Accept only plain decimal literals: an optional sign, digits, at most
/// one '.', at least one digit — no scientific notation (spec.md §6
/// grammar: "decimal literal (no scientific notation)").
fn parse_decimal_literal(text: &str) -> Option<Decimal> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        i = 1;
    }
    if i >= bytes.len() {
        return None;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    for &b in &bytes[i..] {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }
    text.parse::<Decimal>().ok()
}

fn parse_code(
    section: &str,
    constants_count: usize,
    variables_count: usize,
) -> Result<Vec<Instruction>, ProgramError> {
    if section.is_empty() {
        return Err(ProgramError::EmptyCode);
    }

    let mut instructions = Vec::new();
    let mut cursor = 0usize;
    while cursor < section.len() {
        let parsed = parse_instruction(
            &section[cursor..],
            cursor,
            constants_count,
            variables_count,
        )?;
        instructions.push(parsed.instruction);
        cursor += parsed.consumed;

        if instructions.len() > MAX_TABLE_SIZE {
            return Err(ProgramError::TooManyInstructions {
                count: instructions.len(),
            });
        }
    }

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn minimal_program() {
        let program = Program::parse(";;Xx").unwrap();
        assert!(program.variables().is_empty());
        assert!(program.constants().is_empty());
        assert_eq!(program.instructions().len(), 1);
        assert_eq!(program.instructions()[0].opcode, Opcode::Exit);
    }

    #[test]
    fn scenario_pricing_example() {
        let program = Program::parse("x|y;3.14;Lv0CpMlLc0MlSt1Xx").unwrap();
        assert_eq!(program.variables(), &["x".to_string(), "y".to_string()]);
        assert_eq!(program.constants(), &[Decimal::new(314, 2)]);
        assert_eq!(program.instructions().len(), 7);
    }

    #[test]
    fn rejects_empty_code() {
        assert_eq!(Program::parse(";;").unwrap_err(), ProgramError::EmptyCode);
    }

    #[test]
    fn rejects_duplicate_variable_names() {
        assert_eq!(
            Program::parse("x|x;;Xx").unwrap_err(),
            ProgramError::DuplicateVariable { name: "x".to_string() }
        );
    }

    #[test]
    fn triple_pipe_vars_is_three_empty_names() {
        assert_eq!(
            Program::parse("||;;Xx").unwrap_err(),
            ProgramError::EmptyVariableName { index: 0 }
        );
    }

    #[test]
    fn empty_vars_section_is_zero_variables() {
        let program = Program::parse(";;Xx").unwrap();
        assert_eq!(program.variable_count(), 0);
    }

    #[test]
    fn rejects_scientific_notation_constants() {
        assert!(matches!(
            Program::parse(";1e5;Xx").unwrap_err(),
            ProgramError::InvalidConstant { .. }
        ));
    }

    #[test]
    fn source_round_trips_verbatim() {
        let text = "x|y;3.14;Lv0CpMlLc0MlSt1Xx";
        let program = Program::parse(text).unwrap();
        assert_eq!(program.source(), text);
        assert_eq!(program.to_string(), text);
    }
}
