//! Formula Abstract Syntax Tree types

use std::fmt;

/// Arithmetic expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Column reference, resolved against a record at evaluation time
    Column {
        /// Column id
        id: String,
        /// Label used in error messages
        display: String,
    },
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary negation
    Negate(Box<Expr>),
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// Apply with IEEE-754 semantics (division by zero yields infinity or NaN)
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => left / right,
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
}

impl ComparisonOperator {
    /// Parse a comparison symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "==" => Some(ComparisonOperator::Equal),
            "!=" => Some(ComparisonOperator::NotEqual),
            "<" => Some(ComparisonOperator::LessThan),
            ">" => Some(ComparisonOperator::GreaterThan),
            "<=" => Some(ComparisonOperator::LessEqual),
            ">=" => Some(ComparisonOperator::GreaterEqual),
            _ => None,
        }
    }

    /// Check if this is `==` or `!=`
    pub fn is_equality(self) -> bool {
        matches!(self, ComparisonOperator::Equal | ComparisonOperator::NotEqual)
    }

    /// Compare two numbers
    pub fn compare(self, left: f64, right: f64) -> bool {
        match self {
            ComparisonOperator::Equal => left == right,
            ComparisonOperator::NotEqual => left != right,
            ComparisonOperator::LessThan => left < right,
            ComparisonOperator::GreaterThan => left > right,
            ComparisonOperator::LessEqual => left <= right,
            ComparisonOperator::GreaterEqual => left >= right,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::GreaterEqual => ">=",
        };
        f.write_str(symbol)
    }
}
