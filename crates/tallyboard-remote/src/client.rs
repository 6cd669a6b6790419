//! Board client: typed queries and mutations over a [`Transport`].

use serde::de::DeserializeOwned;
use tallyboard_core::{Credentials, Record, TargetColumn};

use crate::error::{RemoteError, Result};
use crate::query;
use crate::transport::{extract_data, GraphqlRequest, Transport};
use crate::types::{
    BoardColumns, BoardItemsPage, BoardsData, ChangeColumnData, ItemsData, ItemsPage,
    NextItemsPageData,
};

/// Client for one source board.
pub struct BoardClient<T> {
    transport: T,
    credentials: Credentials,
}

impl<T: Transport> BoardClient<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// The source board id
    pub fn board_id(&self) -> &str {
        self.credentials.source_board()
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request<D: DeserializeOwned>(&self, request: GraphqlRequest) -> Result<D> {
        let response = self
            .transport
            .send(&request, self.credentials.api_token())
            .await?;
        let data = extract_data(response)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Fetch one page of items. `cursor` is `None` for the first page.
    pub async fn items_page(&self, cursor: Option<&str>, limit: usize) -> Result<ItemsPage> {
        let raw = match cursor {
            None => {
                let data: BoardsData<BoardItemsPage> =
                    self.request(query::items_page(self.board_id(), limit)).await?;
                data.boards
                    .into_iter()
                    .next()
                    .ok_or_else(|| RemoteError::BoardNotFound(self.board_id().to_string()))?
                    .items_page
            }
            Some(cursor) => {
                let data: NextItemsPageData =
                    self.request(query::next_items_page(cursor, limit)).await?;
                data.next_items_page
            }
        };

        let board_id = self.board_id();
        Ok(ItemsPage {
            items: raw.items.into_iter().map(|i| i.into_item(board_id)).collect(),
            cursor: raw.cursor.filter(|c| !c.is_empty()),
        })
    }

    /// Fetch the sub-items of the given parents, flattened in parent order.
    pub async fn child_items(&self, parent_ids: &[String]) -> Result<Vec<Record>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let data: ItemsData = self.request(query::child_items(parent_ids)).await?;
        Ok(data
            .items
            .into_iter()
            .flat_map(|parent| {
                let parent_id = parent.id;
                parent
                    .subitems
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |raw| raw.into_subitem(&parent_id))
            })
            .collect())
    }

    /// Write `value` into one column of one item. Returns the updated item id.
    pub async fn change_column_value(
        &self,
        item_id: &str,
        board_id: &str,
        column_id: &str,
        value: &str,
    ) -> Result<String> {
        tracing::debug!(item_id, board_id, column_id, "changing column value");
        let data: ChangeColumnData = self
            .request(query::change_column_value(item_id, board_id, column_id, value))
            .await?;
        data.change_simple_column_value
            .map(|item| item.id)
            .ok_or_else(|| RemoteError::Decode(format!("no item returned for update of {}", item_id)))
    }

    /// List the source board's columns
    pub async fn columns(&self) -> Result<Vec<TargetColumn>> {
        let data: BoardsData<BoardColumns> =
            self.request(query::board_columns(self.board_id())).await?;
        let board = data
            .boards
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::BoardNotFound(self.board_id().to_string()))?;
        Ok(board
            .columns
            .into_iter()
            .filter_map(|c| c.into_target())
            .collect())
    }
}

impl<T> std::fmt::Debug for BoardClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardClient")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
