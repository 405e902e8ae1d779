//! XOR of truncated differences.
//!
//! A truncated difference records only which class a difference belongs to, plus the exact
//! value where it is known. Both relations below are replayed from fixed minimized covers over
//! the concatenation `input_1 ++ input_2 ++ output`; the covers are data and must not be
//! regenerated.

use crate::cover::{pattern_constraint, Ternary};
use crate::error::{EncodeError, Result};
use crate::model::{Constraint, Var};
use crate::util::{from_binary, to_binary};

/// Bits per operand of the bitwise relation.
pub const BIT_WIDTH: usize = 2;

/// Bits per operand of the wordwise relation: two class bits followed by an 8-bit value.
pub const WORD_WIDTH: usize = 10;

const WORD_VALUE_BITS: usize = 8;

/// Cover of the bitwise relation over classes {0, 1, 2}, each encoded MSB first:
///
/// | a | b | c |
/// |---|---|---|
/// | 0 | 0 | 0 |
/// | 0 | 1 | 1 |
/// | 0 | 2 | 2 |
/// | 1 | 0 | 1 |
/// | 1 | 1 | 0 |
/// | 1 | 2 | 2 |
/// | 2 | 0 | 2 |
/// | 2 | 1 | 2 |
/// | 2 | 2 | 2 |
pub const BITWISE_COVER: [&str; 10] = [
    "-1-000", "-0-100", "----11", "0-0-1-", "-0-0-1", "-1-1-1", "11----", "--1-0-", "1---0-",
    "--11--",
];

/// Cover of the wordwise relation over classes {0, 1, 2, 3}. Class 1 words carry their value,
/// which must be nonzero; every other class has a zero value. When no class exceeds 1 the
/// output value is the XOR of the input values.
///
/// | a | b | c       |
/// |---|---|---------|
/// | 0 | 0 | 0       |
/// | 0 | 1 | 1       |
/// | 0 | 2 | 2       |
/// | 0 | 3 | 3       |
/// | 1 | 0 | 1       |
/// | 1 | 1 | 0 or 1  |
/// | 1 | 2 | 3       |
/// | 1 | 3 | 3       |
/// | 2 | 0 | 2       |
/// | 2 | 1..=3 | 3   |
/// | 3 | * | 3       |
pub const WORDWISE_COVER: [&str; 91] = [
    "0-00000000-0---------1--------", "-0--------0-00000000-1--------", "-1----------00000000-0--------",
    "--00000000-1---------0--------", "---------------------01-------", "--------------------0100000000",
    "---------------------0-1------", "--------------------1-1-------", "---------------------0--1-----",
    "--------------------1--1------", "---------------------0---1----", "--------------------1---1-----",
    "---------------------0----1---", "--------------------1----1----", "---------------------0-----1--",
    "--1---------0-------0-0-------", "--0---------1-------0-0-------", "---------------------0------1-",
    "---1---------0------0--0------", "---0---------1------0--0------", "----1---------0-----0---0-----",
    "----0---------1-----0---0-----", "--------------------1-----1---", "-----1---------0----0----0----",
    "-----0---------1----0----0----", "------1---------0---0-----0---", "------0---------1---0-----0---",
    "-------1---------0--0------0--", "-------0---------1--0------0--", "--------1---------0-0-------0-",
    "--------0---------1-0-------0-", "---------1---------00--------0", "---------0---------10--------0",
    "---------------------0-------1", "--------------------1------1--", "--------------------1-------1-",
    "--------------------1--------1", "0100000000--------------------", "----------0100000000----------",
    "---------0---------0---------1", "---------1---------1---------1", "1---------1----------0--------",
    "0---------0---------1---------", "-------0---------0---------1--", "------0---------0---------1---",
    "-----0---------0---------1----", "----0---------0---------1-----", "---0---------0---------1------",
    "--0---------0---------1-------", "--------0---------0---------1-", "--------1---------1---------1-",
    "--1---------1---------1-------", "------1---------1---------1---", "-----1---------1---------1----",
    "----1---------1---------1-----", "---1---------1---------1------", "-------1---------1---------1--",
    "----------1---------0---------", "1-------------------0---------", "-----------0------1-----------",
    "----------1-------1-----------", "-----------01-----------------", "----------1-1-----------------",
    "-----------0----1-------------", "----------1-----1-------------", "-----------0---1--------------",
    "----------1----1--------------", "-----------0--1---------------", "----------1---1---------------",
    "-----------0-1----------------", "----------1--1----------------", "-0------1---------------------",
    "-0-----1----------------------", "-0----1-----------------------", "-0---1------------------------",
    "-0--1-------------------------", "-0-1--------------------------", "-01---------------------------",
    "-----------0-----1------------", "----------1------1------------", "1-------1---------------------",
    "1------1----------------------", "1-----1-----------------------", "1----1------------------------",
    "1---1-------------------------", "1--1--------------------------", "1-1---------------------------",
    "-----------0-------1----------", "----------1--------1----------", "-0-------1--------------------",
    "1--------1--------------------",
];

fn check_width(operand: &'static str, vars: &[Var], expected: usize) -> Result<()> {
    if vars.len() != expected {
        return Err(EncodeError::WidthMismatch {
            operand,
            expected,
            actual: vars.len(),
        });
    }
    Ok(())
}

fn replay(cover: &[&str], input_1: &[Var], input_2: &[Var], output: &[Var]) -> Vec<Constraint> {
    let vars = [input_1, input_2, output].concat();
    cover
        .iter()
        .map(|row| pattern_constraint(row.chars().map(Ternary::from_char), &vars))
        .collect()
}

/// Truncated XOR of two bit differences. Every operand is a pair of binary variables holding
/// a `BitDifference`.
pub fn xor_truncated(input_1: &[Var], input_2: &[Var], output: &[Var]) -> Result<Vec<Constraint>> {
    check_width("input_1", input_1, BIT_WIDTH)?;
    check_width("input_2", input_2, BIT_WIDTH)?;
    check_width("output", output, BIT_WIDTH)?;
    Ok(replay(&BITWISE_COVER, input_1, input_2, output))
}

/// Truncated XOR of two word differences. Every operand is `WORD_WIDTH` binary variables
/// holding a `WordDifference`.
pub fn xor_truncated_wordwise(
    input_1: &[Var],
    input_2: &[Var],
    output: &[Var],
) -> Result<Vec<Constraint>> {
    check_width("input_1", input_1, WORD_WIDTH)?;
    check_width("input_2", input_2, WORD_WIDTH)?;
    check_width("output", output, WORD_WIDTH)?;
    Ok(replay(&WORDWISE_COVER, input_1, input_2, output))
}

/// Difference of a single bit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BitDifference {
    Zero,
    One,
    Unknown,
}

impl BitDifference {
    pub fn class(self) -> u8 {
        match self {
            BitDifference::Zero => 0,
            BitDifference::One => 1,
            BitDifference::Unknown => 2,
        }
    }

    pub fn bits(self) -> [bool; BIT_WIDTH] {
        let c = self.class();
        [c & 2 != 0, c & 1 != 0]
    }

    pub fn from_bits(bits: &[bool]) -> Option<BitDifference> {
        match bits {
            [false, false] => Some(BitDifference::Zero),
            [false, true] => Some(BitDifference::One),
            [true, false] => Some(BitDifference::Unknown),
            _ => None,
        }
    }
}

/// Difference of a word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WordDifference {
    Zero,
    /// Known nonzero difference.
    Fixed(u8),
    /// Unknown but nonzero.
    Active,
    Unknown,
}

impl WordDifference {
    pub fn class(self) -> u8 {
        match self {
            WordDifference::Zero => 0,
            WordDifference::Fixed(_) => 1,
            WordDifference::Active => 2,
            WordDifference::Unknown => 3,
        }
    }

    /// Class bits then value bits, both MSB first.
    pub fn bits(self) -> Vec<bool> {
        let value = match self {
            WordDifference::Fixed(v) => v,
            _ => 0,
        };
        let c = self.class();
        let mut ret = vec![c & 2 != 0, c & 1 != 0];
        ret.extend(to_binary(value as u64, WORD_VALUE_BITS).into_iter().rev());
        ret
    }

    /// Inverse of `bits`. Encodings outside the relation's domain (a value on a class other
    /// than 1, or class 1 with a zero value) give `None`.
    pub fn from_bits(bits: &[bool]) -> Option<WordDifference> {
        if bits.len() != WORD_WIDTH {
            return None;
        }
        let value_bits = bits[2..].iter().rev().copied().collect::<Vec<_>>();
        let value = from_binary(&value_bits) as u8;
        match (bits[0], bits[1], value) {
            (false, false, 0) => Some(WordDifference::Zero),
            (false, true, v) if v != 0 => Some(WordDifference::Fixed(v)),
            (true, false, 0) => Some(WordDifference::Active),
            (true, true, 0) => Some(WordDifference::Unknown),
            _ => None,
        }
    }
}
