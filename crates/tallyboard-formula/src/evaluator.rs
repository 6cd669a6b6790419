//! Formula evaluator
//!
//! Evaluates a formula against one record. Arithmetic formulas are parsed
//! into an [`Expr`] tree and computed directly; conditional formulas are
//! partitioned into sections, the condition is compared, and the matching
//! branch is evaluated.
//!
//! [`evaluate`] never fails: every error is folded into
//! [`FormulaValue::Error`] carrying the user-facing message.

use crate::ast::{ComparisonOperator, Expr};
use crate::error::{FormulaError, FormulaResult};
use crate::parser::{parse_expression, split_comparison};
use crate::section::partition;
use crate::token::{is_conditional, Formula, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tallyboard_core::{parse_number, Record};

/// Result of evaluating a formula against a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FormulaValue {
    Number(f64),
    /// Text passed through from a non-numeric column
    Text(String),
    Boolean(bool),
    /// Evaluation failure message
    Error(String),
}

impl FormulaValue {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaValue::Error(_))
    }

    /// Get the error message if this is one
    pub fn error_message(&self) -> Option<&str> {
        match self {
            FormulaValue::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text written to the remote column: booleans as `true`/`false`,
    /// numbers in decimal form, text unchanged. Errors have no column text.
    pub fn to_column_text(&self) -> Option<String> {
        match self {
            FormulaValue::Number(n) => Some(format_number(*n)),
            FormulaValue::Text(s) => Some(s.clone()),
            FormulaValue::Boolean(b) => Some(b.to_string()),
            FormulaValue::Error(_) => None,
        }
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Number(n) => f.write_str(&format_number(*n)),
            FormulaValue::Text(s) => f.write_str(s),
            FormulaValue::Boolean(b) => write!(f, "{}", b),
            FormulaValue::Error(msg) => f.write_str(msg),
        }
    }
}

impl From<FormulaError> for FormulaValue {
    fn from(e: FormulaError) -> Self {
        FormulaValue::Error(e.to_string())
    }
}

/// Format a number in shortest decimal form (`8`, `2.5`, `0.1`)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", n)
}

/// Evaluate a formula against a record
///
/// # Example
/// ```rust
/// use tallyboard_core::{ColumnValue, Record};
/// use tallyboard_formula::{evaluate, Formula, FormulaValue, Keyword, Token};
///
/// let formula = Formula::new(vec![
///     Token::logical(Keyword::If),
///     Token::column("qty", "Qty"),
///     Token::condition(">"),
///     Token::number("10"),
///     Token::logical(Keyword::Then),
///     Token::logical(Keyword::True),
///     Token::logical(Keyword::Else),
///     Token::logical(Keyword::False),
/// ]);
/// let record = Record::item("1", "Row", "10")
///     .with_column(ColumnValue::new("qty", "Qty", "numbers", "12"));
///
/// assert_eq!(evaluate(&formula, &record), FormulaValue::Boolean(true));
/// ```
pub fn evaluate(formula: &Formula, record: &Record) -> FormulaValue {
    evaluate_tokens(formula.tokens(), record).unwrap_or_else(FormulaValue::from)
}

fn evaluate_tokens(tokens: &[Token], record: &Record) -> FormulaResult<FormulaValue> {
    if !is_conditional(tokens) {
        return evaluate_arithmetic(tokens, record).map(FormulaValue::Number);
    }
    evaluate_conditional(tokens, record)
}

/// Parse and compute an arithmetic token run; non-finite results fail.
fn evaluate_arithmetic(tokens: &[Token], record: &Record) -> FormulaResult<f64> {
    let expr = parse_expression(tokens)?;
    let value = evaluate_expr(&expr, record)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NotFinite)
    }
}

fn evaluate_expr(expr: &Expr, record: &Record) -> FormulaResult<f64> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Column { id, display } => column_number(record, id, display),
        Expr::BinaryOp { op, left, right } => {
            let l = evaluate_expr(left, record)?;
            let r = evaluate_expr(right, record)?;
            Ok(op.apply(l, r))
        }
        Expr::Negate(operand) => Ok(-evaluate_expr(operand, record)?),
    }
}

fn column_number(record: &Record, id: &str, display: &str) -> FormulaResult<f64> {
    let column = record
        .column(id)
        .ok_or_else(|| FormulaError::MissingColumn(display.to_string()))?;
    column.as_number().ok_or_else(|| FormulaError::NonNumeric {
        column: display.to_string(),
        text: column.text.clone(),
    })
}

/// A branch or operand: a lone `true`/`false` keyword, or arithmetic
fn evaluate_sub_expression(tokens: &[Token], record: &Record) -> FormulaResult<FormulaValue> {
    if let [token] = tokens {
        if let Some(b) = token.as_bool() {
            return Ok(FormulaValue::Boolean(b));
        }
    }
    evaluate_arithmetic(tokens, record).map(FormulaValue::Number)
}

fn evaluate_conditional(tokens: &[Token], record: &Record) -> FormulaResult<FormulaValue> {
    let sections = partition(tokens);
    if !sections.has_if || !sections.has_then {
        return Err(FormulaError::MissingIfOrThen);
    }
    if !sections.is_ordered() {
        return match (sections.then_index(), sections.else_index()) {
            (Some(t), Some(e)) if e < t => Err(FormulaError::ElseBeforeThen),
            _ => Err(FormulaError::MissingIfOrThen),
        };
    }

    let comparison = split_comparison(sections.condition)?;
    let lenient = comparison.op.is_equality();
    let left = evaluate_operand(comparison.left, record, lenient)?;
    let right = evaluate_operand(comparison.right, record, lenient)?;
    let outcome = compare(comparison.op, &left, &right)?;

    let branch = if outcome {
        sections.then_branch
    } else {
        sections.else_branch
    };

    if branch.is_empty() {
        if outcome {
            return Ok(FormulaValue::Boolean(true));
        }
        return Ok(pass_through(comparison.left, record).unwrap_or(FormulaValue::Boolean(false)));
    }

    evaluate_sub_expression(branch, record)
}

/// The original value of a lone left-hand column, used when the condition is
/// false and there is no else-branch.
fn pass_through(left: &[Token], record: &Record) -> Option<FormulaValue> {
    match left {
        [token] if token.kind == TokenKind::Column => {
            let column = record.column(&token.value)?;
            Some(match column.as_number() {
                Some(n) => FormulaValue::Number(n),
                None => FormulaValue::Text(column.text.clone()),
            })
        }
        _ => None,
    }
}

/// Comparison operand after evaluation
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
    Boolean(bool),
}

/// Evaluate one side of a comparison. With `lenient_text`, a lone column
/// whose text is not numeric compares as text instead of failing.
fn evaluate_operand(tokens: &[Token], record: &Record, lenient_text: bool) -> FormulaResult<Operand> {
    if let [token] = tokens {
        if let Some(b) = token.as_bool() {
            return Ok(Operand::Boolean(b));
        }
        if lenient_text && token.kind == TokenKind::Column {
            let column = record
                .column(&token.value)
                .ok_or_else(|| FormulaError::MissingColumn(token.label().to_string()))?;
            return Ok(match column.as_number() {
                Some(n) => Operand::Number(n),
                None => Operand::Text(column.text.clone()),
            });
        }
    }
    evaluate_arithmetic(tokens, record).map(Operand::Number)
}

fn compare(op: ComparisonOperator, left: &Operand, right: &Operand) -> FormulaResult<bool> {
    match op {
        ComparisonOperator::Equal => Ok(loose_equal(left, right)),
        ComparisonOperator::NotEqual => Ok(!loose_equal(left, right)),
        _ => Ok(op.compare(operand_number(left)?, operand_number(right)?)),
    }
}

fn operand_number(operand: &Operand) -> FormulaResult<f64> {
    match operand {
        Operand::Number(n) => Ok(*n),
        Operand::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Operand::Text(s) => parse_number(s).ok_or_else(|| FormulaError::NonNumeric {
            column: "comparison".into(),
            text: s.clone(),
        }),
    }
}

fn loose_equal(left: &Operand, right: &Operand) -> bool {
    use Operand::*;
    match (left, right) {
        (Number(a), Number(b)) => a == b,
        (Text(a), Text(b)) => a == b,
        (Boolean(a), Boolean(b)) => a == b,
        (Number(n), Text(t)) | (Text(t), Number(n)) => parse_number(t) == Some(*n),
        (Boolean(b), Number(n)) | (Number(n), Boolean(b)) => (if *b { 1.0 } else { 0.0 }) == *n,
        (Boolean(b), Text(t)) | (Text(t), Boolean(b)) => {
            t.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" })
        }
    }
}
