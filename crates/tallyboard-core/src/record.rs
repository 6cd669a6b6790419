//! Board records and column values

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parse column text as a finite number.
///
/// Surrounding whitespace is ignored. Empty text, non-numeric text and the
/// textual spellings of infinity/NaN all fail.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Whether a record is a top-level item or a sub-item of another item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Top-level board item
    #[default]
    Item,
    /// Child item nested under a parent item
    Subitem,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Item => write!(f, "item"),
            RecordKind::Subitem => write!(f, "subitem"),
        }
    }
}

/// One column cell of a record, as reported by the board service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnValue {
    /// Column identifier (stable across records of a board)
    pub id: String,
    /// Human-readable column title
    pub title: String,
    /// Service-specific column type (e.g. "numbers", "text", "status")
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw JSON-encoded value, if the service provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Primary textual representation, used by the evaluator
    #[serde(default)]
    pub text: String,
}

impl ColumnValue {
    /// Create a column value from its text representation
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: kind.into(),
            value: None,
            text: text.into(),
        }
    }

    /// Attach the raw service value
    pub fn with_raw_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Try to get the text as a finite number
    pub fn as_number(&self) -> Option<f64> {
        parse_number(&self.text)
    }

    /// Check if the text is numeric
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }
}

/// A row of a remote board
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Record identifier
    pub id: String,
    /// Record name (first column of the board)
    pub name: String,
    /// Board the record lives on. Sub-items live on their own board.
    pub board_id: String,
    /// Group identifier
    #[serde(default)]
    pub group_id: String,
    /// Group title
    #[serde(default)]
    pub group_title: String,
    /// Item or sub-item
    #[serde(rename = "type", default)]
    pub kind: RecordKind,
    /// Parent item id for sub-items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Whether the service reported sub-items under this record
    #[serde(default)]
    pub has_children: bool,
    /// Column values keyed by column id
    #[serde(default)]
    pub columns: AHashMap<String, ColumnValue>,
}

impl Record {
    /// Create a top-level item with no columns
    pub fn item(id: impl Into<String>, name: impl Into<String>, board_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_id: board_id.into(),
            ..Default::default()
        }
    }

    /// Create a sub-item of `parent_id` with no columns
    pub fn subitem(
        id: impl Into<String>,
        name: impl Into<String>,
        board_id: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_id: board_id.into(),
            kind: RecordKind::Subitem,
            parent_id: Some(parent_id.into()),
            ..Default::default()
        }
    }

    /// Set the group
    pub fn with_group(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.group_id = id.into();
        self.group_title = title.into();
        self
    }

    /// Add (or replace) a column value
    pub fn with_column(mut self, column: ColumnValue) -> Self {
        self.insert_column(column);
        self
    }

    /// Add (or replace) a column value in place
    pub fn insert_column(&mut self, column: ColumnValue) {
        self.columns.insert(column.id.clone(), column);
    }

    /// Look up a column by id
    pub fn column(&self, id: &str) -> Option<&ColumnValue> {
        self.columns.get(id)
    }

    /// Text of a column, if present
    pub fn column_text(&self, id: &str) -> Option<&str> {
        self.column(id).map(|c| c.text.as_str())
    }

    /// Check if the record is a sub-item
    pub fn is_subitem(&self) -> bool {
        self.kind == RecordKind::Subitem
    }
}
