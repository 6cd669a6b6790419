//! Remote service credentials

use crate::error::{Error, Result};
use std::fmt;

/// API token and source board for remote calls.
///
/// The token is never included in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_token: String,
    source_board: String,
}

impl Credentials {
    /// Create credentials, validating the token and board id
    pub fn new(api_token: impl Into<String>, source_board: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        let source_board = source_board.into().trim().to_string();

        if api_token.trim().is_empty() {
            return Err(Error::EmptyToken);
        }
        if source_board.is_empty() || !source_board.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidBoardId(source_board));
        }

        Ok(Self {
            api_token,
            source_board,
        })
    }

    /// The API token
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// The board records are read from
    pub fn source_board(&self) -> &str {
        &self.source_board
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("source_board", &self.source_board)
            .finish()
    }
}
