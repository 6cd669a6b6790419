//! Response payloads of the board service and their conversion into records.

use serde::Deserialize;
use tallyboard_core::{ColumnValue, Record, TargetColumn};

/// One page of items plus the cursor for the next page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemsPage {
    pub items: Vec<Record>,
    /// Absent on the last page
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoardsData<T> {
    pub boards: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoardItemsPage {
    pub items_page: RawItemsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NextItemsPageData {
    pub next_items_page: RawItemsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawItemsPage {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemsData {
    #[serde(default)]
    pub items: Vec<RawParent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawParent {
    pub id: String,
    #[serde(default)]
    pub subitems: Option<Vec<RawItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoardColumns {
    #[serde(default)]
    pub columns: Vec<RawColumn>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawColumn {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangeColumnData {
    pub change_simple_column_value: Option<IdOnly>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGroup {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub board: Option<IdOnly>,
    #[serde(default)]
    pub group: Option<RawGroup>,
    #[serde(default)]
    pub subitems: Option<Vec<IdOnly>>,
    #[serde(default)]
    pub column_values: Vec<RawColumnValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub column: Option<RawColumnTitle>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawColumnTitle {
    #[serde(default)]
    pub title: String,
}

impl RawItem {
    /// Convert a top-level item; `board_id` is used when the item omits its board.
    pub(crate) fn into_item(self, board_id: &str) -> Record {
        let has_children = self.subitems.as_ref().is_some_and(|s| !s.is_empty());
        let board = self
            .board
            .as_ref()
            .map_or_else(|| board_id.to_string(), |b| b.id.clone());
        let mut record = Record::item(self.id.clone(), self.name.clone(), board);
        record.has_children = has_children;
        self.fill(record)
    }

    /// Convert a sub-item of `parent_id`
    pub(crate) fn into_subitem(self, parent_id: &str) -> Record {
        let board = self.board.as_ref().map(|b| b.id.clone()).unwrap_or_default();
        let record = Record::subitem(self.id.clone(), self.name.clone(), board, parent_id);
        self.fill(record)
    }

    fn fill(self, mut record: Record) -> Record {
        if let Some(group) = self.group {
            record = record.with_group(group.id, group.title);
        }
        for raw in self.column_values {
            record.insert_column(raw.into_column_value());
        }
        record
    }
}

impl RawColumnValue {
    fn into_column_value(self) -> ColumnValue {
        let title = self.column.map(|c| c.title).unwrap_or_default();
        let column = ColumnValue::new(
            self.id,
            title,
            self.kind.unwrap_or_default(),
            self.text.unwrap_or_default(),
        );
        match self.value {
            Some(value) => column.with_raw_value(value),
            None => column,
        }
    }
}

impl RawColumn {
    /// Columns the service returns always carry an id; empty ids are dropped.
    pub(crate) fn into_target(self) -> Option<TargetColumn> {
        TargetColumn::new(self.id, self.title, self.kind).ok()
    }
}
