//! Error types for tallyboard-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tallyboard-core
#[derive(Debug, Error)]
pub enum Error {
    /// API token was empty
    #[error("API token must not be empty")]
    EmptyToken,

    /// Board id is not a numeric identifier
    #[error("Invalid board id: '{0}'")]
    InvalidBoardId(String),

    /// Column id was empty
    #[error("Column id must not be empty")]
    EmptyColumnId,
}
