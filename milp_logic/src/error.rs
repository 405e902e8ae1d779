use thiserror::Error;

/// Precondition failures detected while generating constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The condition list and the branch list of an if-elif-else differ in length.
    #[error("{conditions} conditions given for {branches} branches")]
    ArityMismatch { conditions: usize, branches: usize },

    /// A truncated-difference operand does not have the width of its table.
    #[error("{operand} has {actual} variables, expected {expected}")]
    WidthMismatch {
        operand: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No inequality cover can be provided for this XOR arity.
    #[error("xor arity {arity} exceeds the supported maximum {max}")]
    UnsupportedArity { arity: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EncodeError>;
