//! Per-record applicability checks
//!
//! Before a formula is applied to a record, every referenced column must
//! exist on it and hold numeric text. A column that only ever appears as a
//! lone operand of `==`/`!=` may hold any text.

use crate::parser::split_comparison;
use crate::section::partition;
use crate::token::{Formula, TokenKind};
use std::collections::HashSet;
use tallyboard_core::Record;
use thiserror::Error;

/// Why a record cannot take the formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing column: {display}")]
    MissingColumn { display: String },

    #[error("Non-numeric value in column {display}: '{text}'")]
    NonNumeric { display: String, text: String },
}

/// Check that `record` has everything `formula` needs.
///
/// Returns the first problem found, in token order.
pub fn validate_record(formula: &Formula, record: &Record) -> Result<(), ValidationError> {
    let tokens = formula.tokens();
    let text_tolerant = text_tolerant_positions(formula);

    // Columns referenced outside an equality context need numbers
    let numeric_required: HashSet<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| t.kind == TokenKind::Column && !text_tolerant.contains(i))
        .map(|(_, t)| t.value.as_str())
        .collect();

    for token in formula.referenced_columns() {
        let column = record
            .column(&token.value)
            .ok_or_else(|| ValidationError::MissingColumn {
                display: token.label().to_string(),
            })?;

        if numeric_required.contains(token.value.as_str()) && !column.is_numeric() {
            return Err(ValidationError::NonNumeric {
                display: token.label().to_string(),
                text: column.text.clone(),
            });
        }
    }

    Ok(())
}

/// Token indices of columns standing alone on either side of `==`/`!=`
fn text_tolerant_positions(formula: &Formula) -> Vec<usize> {
    let tokens = formula.tokens();
    let sections = partition(tokens);
    if !sections.has_if {
        return Vec::new();
    }

    let Ok(comparison) = split_comparison(sections.condition) else {
        return Vec::new();
    };
    if !comparison.op.is_equality() {
        return Vec::new();
    }

    let start = sections.condition_range().start;
    let mut positions = Vec::with_capacity(2);
    if let [t] = comparison.left {
        if t.kind == TokenKind::Column {
            positions.push(start);
        }
    }
    if let [t] = comparison.right {
        if t.kind == TokenKind::Column {
            positions.push(start + comparison.op_index + 1);
        }
    }
    positions
}
