//! # tallyboard
//!
//! Apply small token formulas across the records of a remote work board.
//!
//! ## Features
//!
//! - Arithmetic and `IF … THEN … ELSE …` formulas over record columns
//! - Single-record preview of what a formula would write
//! - Cursor-paginated item fetching, plus chunked sub-item fetching
//! - Sequential, cancellable batch write-back with per-record accounting
//!
//! ## Example
//!
//! ```rust
//! use tallyboard::prelude::*;
//!
//! let formula = Formula::new(vec![
//!     Token::column("hours", "Hours"),
//!     Token::operator("*"),
//!     Token::number("1.5"),
//! ]);
//! let record = Record::item("1", "Overtime", "100")
//!     .with_column(ColumnValue::new("hours", "Hours", "numbers", "8"));
//!
//! let p = preview(&formula, &record);
//! assert_eq!(p.written.as_deref(), Some("12"));
//! ```
//!
//! The scripted test transport is not part of this crate's API; tests
//! import it from `tallyboard_remote`:
//!
//! ```compile_fail
//! use tallyboard::ScriptedTransport;
//! ```

pub mod fetch;
pub mod prelude;
pub mod preview;
pub mod processing;

pub use fetch::{FetchOptions, FetchOutcome, FetchProgress, FetchStage, RecordFetcher};
pub use preview::{preview, Preview};
pub use processing::{
    BatchProcessor, CancellationFlag, Example, ProcessingOptions, ProcessingProgress,
    ProcessingResult, ProcessingSummary, RecordStatus, WRITE_FAILED,
};

// Re-export core types
pub use tallyboard_core::{ColumnValue, Credentials, Record, RecordKind, TargetColumn};

// Re-export formula types
pub use tallyboard_formula::{
    evaluate, partition, Formula, FormulaError, FormulaValue, Keyword, Sections, Token, TokenKind,
};

// Re-export remote types
pub use tallyboard_remote::{BoardClient, HttpTransport, RemoteConfig, RemoteError, Transport};
