//! # tallyboard-formula
//!
//! Formula model and evaluator for tallyboard.
//!
//! This crate provides:
//! - The token model ([`Token`], [`Formula`]) produced by the formula builder
//! - Section partitioning of conditional formulas ([`partition`])
//! - A recursive descent parser over token sequences (tokens → AST)
//! - Formula evaluation against a single [`Record`](tallyboard_core::Record)
//! - Per-record applicability checks ([`validate_record`])
//!
//! ## Example
//!
//! ```rust
//! use tallyboard_core::{ColumnValue, Record};
//! use tallyboard_formula::{evaluate, Formula, FormulaValue, Token};
//!
//! let formula = Formula::new(vec![
//!     Token::column("price", "Price"),
//!     Token::operator("*"),
//!     Token::number("2"),
//! ]);
//! let record = Record::item("1", "Widget", "10")
//!     .with_column(ColumnValue::new("price", "Price", "numbers", "21"));
//!
//! assert_eq!(evaluate(&formula, &record), FormulaValue::Number(42.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod section;
pub mod token;
pub mod validation;

pub use ast::{BinaryOperator, ComparisonOperator, Expr};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, format_number, FormulaValue};
pub use parser::{parse_expression, split_comparison, Comparison};
pub use section::{partition, Sections};
pub use token::{Formula, Keyword, Token, TokenKind};
pub use validation::{validate_record, ValidationError};
