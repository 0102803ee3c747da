//! Low-level DSMAL grammar (spec.md §6 "DSMAL grammar (bit-exact)").
//!
//! The three top-level sections are split by hand (their separators can
//! never appear inside a well-formed section, so a combinator isn't
//! pulling its weight there); the `CODE` section's instruction stream is
//! tokenized with `nom`, one `UPPER LOWER PARAM?` triple at a time, so
//! each call site keeps the byte offset needed for precise diagnostics
//! (spec.md §6 "Error object shape" wants `instruction`/`opcode`
//! attributes, and construction-time errors deserve the same precision).

use nom::character::complete::{digit1, satisfy};
use nom::sequence::tuple;
use nom::IResult;

use crate::error::ProgramError;
use crate::opcode::{Instruction, Opcode};

/// Split `source` into its three `;`-delimited sections. Fails unless
/// there are exactly two `;` separators.
pub fn split_sections(source: &str) -> Result<(&str, &str, &str), ProgramError> {
    let parts: Vec<&str> = source.split(';').collect();
    match parts.as_slice() {
        [vars, consts, code] => Ok((vars, consts, code)),
        other => Err(ProgramError::WrongSectionCount {
            found: other.len() - 1,
        }),
    }
}

/// Split a `|`-delimited section into its entries. An empty section text
/// means zero entries (not one empty entry) — spec.md §4.1: `"||"` is
/// three empty names and fails, but `""` is zero names and is fine.
pub fn split_entries(section: &str) -> Vec<&str> {
    if section.is_empty() {
        Vec::new()
    } else {
        section.split('|').collect()
    }
}

fn mnemonic_letters(input: &str) -> IResult<&str, (char, char)> {
    tuple((
        satisfy(|c: char| c.is_ascii_uppercase()),
        satisfy(|c: char| c.is_ascii_lowercase()),
    ))(input)
}

/// One decoded instruction plus how many source bytes it consumed.
#[derive(Debug)]
pub struct ParsedInstruction {
    pub instruction: Instruction,
    pub consumed: usize,
}

/// Decode a single instruction at the start of `input`, given how many
/// constants/variables have already been parsed (for bounds-checking
/// `Lc`/`Lv`/`St` parameters). `offset` is only used to build error
/// messages with the right byte position.
pub fn parse_instruction(
    input: &str,
    offset: usize,
    constants_count: usize,
    variables_count: usize,
) -> Result<ParsedInstruction, ProgramError> {
    let (rest, (c1, c2)) = mnemonic_letters(input).map_err(|_| {
        let found: String = input.chars().take(2).collect();
        ProgramError::UnknownOpcode {
            letters: found,
            offset,
        }
    })?;

    let mnemonic: String = [c1, c2].into_iter().collect();
    let opcode = Opcode::from_mnemonic(&mnemonic).ok_or(ProgramError::UnknownOpcode {
        letters: mnemonic.clone(),
        offset,
    })?;

    let (rest, param) = if opcode.takes_param() {
        let (rest, digits) = digit1(rest).map_err(|_: nom::Err<nom::error::Error<&str>>| {
            ProgramError::MissingParameter {
                mnemonic: mnemonic.clone(),
                offset,
            }
        })?;
        let value: u64 = digits
            .parse()
            .expect("digit1 only matches ASCII decimal digits");
        if value > u16::MAX as u64 {
            return Err(ProgramError::ParameterTooLarge { value, offset });
        }
        (rest, value as u16)
    } else if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ProgramError::UnexpectedParameter {
            mnemonic: mnemonic.clone(),
            offset,
        });
    } else {
        (rest, 0)
    };

    match opcode {
        Opcode::LoadConstant if param as usize >= constants_count => {
            return Err(ProgramError::ConstantIndexOutOfRange {
                index: param,
                count: constants_count,
            });
        }
        Opcode::LoadVariable | Opcode::SetVariable if param as usize >= variables_count => {
            return Err(ProgramError::VariableIndexOutOfRange {
                index: param,
                count: variables_count,
            });
        }
        _ => {}
    }

    let consumed = input.len() - rest.len();
    Ok(ParsedInstruction {
        instruction: Instruction { opcode, param },
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_three_sections() {
        assert_eq!(split_sections("x;1;Xx").unwrap(), ("x", "1", "Xx"));
    }

    #[test]
    fn rejects_wrong_section_count() {
        assert_eq!(
            split_sections("x;1;2;Xx").unwrap_err(),
            ProgramError::WrongSectionCount { found: 3 }
        );
        assert_eq!(
            split_sections("x;Xx").unwrap_err(),
            ProgramError::WrongSectionCount { found: 1 }
        );
    }

    #[test]
    fn empty_section_is_zero_entries() {
        assert!(split_entries("").is_empty());
        assert_eq!(split_entries("||").len(), 3);
    }

    #[test]
    fn decodes_parameterless_instruction() {
        let parsed = parse_instruction("Xx", 0, 0, 0).unwrap();
        assert_eq!(parsed.instruction.opcode, Opcode::Exit);
        assert_eq!(parsed.consumed, 2);
    }

    #[test]
    fn decodes_parameterized_instruction() {
        let parsed = parse_instruction("Ju123rest", 0, 0, 0).unwrap();
        assert_eq!(parsed.instruction.opcode, Opcode::JumpUnconditional);
        assert_eq!(parsed.instruction.param, 123);
        assert_eq!(parsed.consumed, 5);
    }

    #[test]
    fn rejects_parameter_over_limit() {
        let err = parse_instruction("Ju99999", 0, 0, 0).unwrap_err();
        assert_eq!(
            err,
            ProgramError::ParameterTooLarge {
                value: 99999,
                offset: 0
            }
        );
    }

    #[test]
    fn rejects_missing_parameter() {
        let err = parse_instruction("Ju", 0, 0, 0).unwrap_err();
        assert_eq!(
            err,
            ProgramError::MissingParameter {
                mnemonic: "Ju".to_string(),
                offset: 0
            }
        );
    }

    #[test]
    fn rejects_unexpected_parameter_on_parameterless_opcode() {
        let err = parse_instruction("Xx5Xx", 0, 0, 0).unwrap_err();
        assert_eq!(
            err,
            ProgramError::UnexpectedParameter {
                mnemonic: "Xx".to_string(),
                offset: 0
            }
        );
    }

    #[test]
    fn rejects_out_of_range_constant_index() {
        let err = parse_instruction("Lc0", 0, 0, 0).unwrap_err();
        assert_eq!(
            err,
            ProgramError::ConstantIndexOutOfRange { index: 0, count: 0 }
        );
    }
}
