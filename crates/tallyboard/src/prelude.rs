//! Prelude module - common imports for tallyboard users
//!
//! ```rust
//! use tallyboard::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    preview,
    BatchProcessor,
    CancellationFlag,
    FetchOptions,
    FetchOutcome,
    Preview,
    ProcessingOptions,
    ProcessingSummary,
    RecordFetcher,
    RecordStatus,

    // Remote
    BoardClient,
    HttpTransport,
    RemoteConfig,
    Transport,

    // Formula
    evaluate,
    Formula,
    FormulaValue,
    Keyword,
    Token,
    TokenKind,

    // Core
    ColumnValue,
    Credentials,
    Record,
    TargetColumn,
};
