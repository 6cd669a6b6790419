//! Error types for the board service client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("GraphQL error: {}", .0.join("; "))]
    Graphql(Vec<String>),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    Join(String),

    #[error("Board {0} not found")]
    BoardNotFound(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
