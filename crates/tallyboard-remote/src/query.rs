//! GraphQL documents and request builders for the board service.

use serde_json::json;

use crate::transport::GraphqlRequest;

/// Fields requested for every item and sub-item
const ITEM_FIELDS: &str = "id name board { id } group { id title } \
     column_values { id text value type column { title } }";

/// First page of a board's items
pub fn items_page(board_id: &str, limit: usize) -> GraphqlRequest {
    let query = format!(
        "query ($boardId: [ID!], $limit: Int!) {{ boards(ids: $boardId) {{ \
         items_page(limit: $limit) {{ cursor items {{ {ITEM_FIELDS} subitems {{ id }} }} }} }} }}"
    );
    GraphqlRequest::new(query, json!({ "boardId": [board_id], "limit": limit }))
}

/// A page after the first, addressed by the previous page's cursor
pub fn next_items_page(cursor: &str, limit: usize) -> GraphqlRequest {
    let query = format!(
        "query ($cursor: String!, $limit: Int!) {{ next_items_page(limit: $limit, cursor: $cursor) {{ \
         cursor items {{ {ITEM_FIELDS} subitems {{ id }} }} }} }}"
    );
    GraphqlRequest::new(query, json!({ "cursor": cursor, "limit": limit }))
}

/// Sub-items of the given parent items
pub fn child_items(parent_ids: &[String]) -> GraphqlRequest {
    let query = format!(
        "query ($ids: [ID!]) {{ items(ids: $ids) {{ id subitems {{ {ITEM_FIELDS} }} }} }}"
    );
    GraphqlRequest::new(query, json!({ "ids": parent_ids }))
}

/// Column definitions of a board
pub fn board_columns(board_id: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "query ($boardId: [ID!]) { boards(ids: $boardId) { columns { id title type } } }",
        json!({ "boardId": [board_id] }),
    )
}

/// Single-column update
pub fn change_column_value(
    item_id: &str,
    board_id: &str,
    column_id: &str,
    value: &str,
) -> GraphqlRequest {
    GraphqlRequest::new(
        "mutation ($itemId: ID!, $boardId: ID!, $columnId: String!, $value: String) { \
         change_simple_column_value(item_id: $itemId, board_id: $boardId, \
         column_id: $columnId, value: $value) { id } }",
        json!({
            "itemId": item_id,
            "boardId": board_id,
            "columnId": column_id,
            "value": value,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_items_page_variables() {
        let req = items_page("123", 100);
        assert!(req.query.contains("items_page(limit: $limit)"));
        assert!(req.query.contains("subitems { id }"));
        assert_eq!(req.variables, json!({"boardId": ["123"], "limit": 100}));
    }

    #[test]
    fn test_next_items_page_variables() {
        let req = next_items_page("abc", 50);
        assert!(req.query.contains("next_items_page"));
        assert_eq!(req.variables, json!({"cursor": "abc", "limit": 50}));
    }

    #[test]
    fn test_child_items_variables() {
        let req = child_items(&["1".to_string(), "2".to_string()]);
        assert!(req.query.contains("items(ids: $ids)"));
        assert_eq!(req.variables, json!({"ids": ["1", "2"]}));
    }

    #[test]
    fn test_change_column_value_variables() {
        let req = change_column_value("11", "22", "numbers9", "42");
        assert!(req.query.starts_with("mutation"));
        assert_eq!(
            req.variables,
            json!({"itemId": "11", "boardId": "22", "columnId": "numbers9", "value": "42"})
        );
    }
}
