//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while building, parsing or evaluating a formula.
///
/// The `Display` text of each variant is the message surfaced to users when
/// evaluation fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Token sequence could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula has no tokens to evaluate
    #[error("Formula is empty")]
    Empty,

    /// Number token whose text is not a number
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Referenced column is absent on the record
    #[error("Column {0} not found")]
    MissingColumn(String),

    /// Referenced column text is not numeric
    #[error("Column {column} is not a number: '{text}'")]
    NonNumeric { column: String, text: String },

    /// Arithmetic produced infinity or NaN
    #[error("NaN")]
    NotFinite,

    /// Conditional formula lacks IF or THEN, or has them out of order
    #[error("Invalid conditional formula: missing IF or THEN")]
    MissingIfOrThen,

    /// ELSE appears before THEN
    #[error("Invalid conditional formula: ELSE must follow THEN")]
    ElseBeforeThen,

    /// Condition does not contain exactly one comparison
    #[error("Condition must contain exactly one comparison, found {0}")]
    ComparisonCount(usize),

    /// One side of the comparison is empty
    #[error("Comparison is missing an operand")]
    MissingOperand,

    /// Unrecognized comparison symbol
    #[error("Unknown comparison operator: {0}")]
    UnknownComparison(String),

    /// Keyword added out of order while building a formula
    #[error("{0}")]
    KeywordOrder(&'static str),

    /// Keyword added twice while building a formula
    #[error("{0} is already in the formula")]
    DuplicateKeyword(String),
}
