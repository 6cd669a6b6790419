//! # tallyboard-core
//!
//! Core data structures for tallyboard.
//!
//! This crate provides the fundamental types shared by the formula engine and
//! the remote pipeline:
//! - [`Record`] - One row of a remote board, with its column values
//! - [`ColumnValue`] - A single column cell as reported by the board service
//! - [`TargetColumn`] - The column a computed result is written into
//! - [`Credentials`] - API token and source board used for remote calls
//!
//! ## Example
//!
//! ```rust
//! use tallyboard_core::{ColumnValue, Record};
//!
//! let record = Record::item("1001", "Widget", "board-1")
//!     .with_column(ColumnValue::new("price", "Price", "numbers", "12.5"));
//!
//! assert_eq!(record.column("price").and_then(|c| c.as_number()), Some(12.5));
//! ```

pub mod column;
pub mod credentials;
pub mod error;
pub mod record;

// Re-exports for convenience
pub use column::TargetColumn;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use record::{parse_number, ColumnValue, Record, RecordKind};
