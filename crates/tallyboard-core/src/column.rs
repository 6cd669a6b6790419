//! Column descriptors

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The column a computed result is written into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetColumn {
    /// Column identifier
    pub id: String,
    /// Column title
    pub title: String,
    /// Service-specific column type
    #[serde(rename = "type")]
    pub kind: String,
}

impl TargetColumn {
    /// Create a new target column descriptor
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::EmptyColumnId);
        }
        Ok(Self {
            id,
            title: title.into(),
            kind: kind.into(),
        })
    }
}

impl fmt::Display for TargetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}
