//! Column schema and layout endpoints
//!
//! The layout is shared by every client of a table: an action posted here
//! changes what the next table request renders.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use moneydesk_core::TableKind;
use moneydesk_grid::{ColumnDefinition, ColumnLayout, ColumnState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema<'a> {
    #[serde(flatten)]
    pub definition: &'a ColumnDefinition,
    /// Display formats the column accepts; empty when it has none
    pub formats: &'static [&'static str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsResponse<'a> {
    pub table: TableKind,
    pub columns: Vec<ColumnSchema<'a>>,
    pub layout: &'a [ColumnState],
    /// Column ids in display order, hidden columns included
    pub display_order: Vec<String>,
}

async fn columns_json(state: &AppState, kind: TableKind) -> ApiResult<serde_json::Value> {
    let registry = kind.registry()?;
    let layout = state.layout(kind).await?;
    let response = ColumnsResponse {
        table: kind,
        columns: registry
            .iter()
            .map(|definition| ColumnSchema {
                definition,
                formats: kind.formats_for(&definition.id),
            })
            .collect(),
        layout: layout.states(),
        display_order: layout.display_order(),
    };
    serde_json::to_value(&response).map_err(|_| ApiError::InternalError)
}

/// Column schema and current layout of a table (JSON API)
pub async fn api_columns(state: State<AppState>, table: Path<String>) -> ApiResult<Json<serde_json::Value>> {
    let kind: TableKind = table.0.parse()?;
    Ok(Json(columns_json(&state, kind).await?))
}

pub async fn api_transaction_columns(state: State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(columns_json(&state, TableKind::Transactions).await?))
}

/// A change to a table's column layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum LayoutAction {
    /// Move `source` before `target`, or to the end without one
    Reorder { source: String, target: Option<String> },
    Resize { id: String, width: u32 },
    Toggle { id: String },
    Pin { id: String },
    /// `None` restores the column's default format
    Format { id: String, format: Option<String> },
    Reset,
}

fn apply_action(kind: TableKind, layout: &mut ColumnLayout, action: &LayoutAction) -> ApiResult<bool> {
    let registry = kind.registry()?;
    let changed = match action {
        LayoutAction::Reorder { source, target } => {
            registry.require(source)?;
            layout.reorder(source, target.as_deref())
        }
        LayoutAction::Resize { id, width } => {
            let before = layout.state(id).map(|s| s.width);
            Some(layout.resize(&registry, id, *width)?) != before
        }
        LayoutAction::Toggle { id } => layout.toggle_visibility(&registry, id)?,
        LayoutAction::Pin { id } => {
            registry.require(id)?;
            layout.toggle_pin(id)?;
            true
        }
        LayoutAction::Format { id, format } => {
            if let Some(format) = format {
                if !kind.formats_for(id).contains(&format.as_str()) {
                    return Err(ApiError::bad_request(format!(
                        "Column {} does not support format {}",
                        id, format
                    )));
                }
            }
            layout.set_format(id, format.clone())?;
            true
        }
        LayoutAction::Reset => {
            layout.reset(&registry);
            true
        }
    };
    Ok(changed)
}

/// Apply a layout action and persist the result (JSON API)
pub async fn api_columns_update(
    state: State<AppState>,
    table: Path<String>,
    Json(action): Json<LayoutAction>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind: TableKind = table.0.parse()?;
    let changed = state
        .update_layout(kind, |layout| apply_action(kind, layout, &action))
        .await?;
    if changed {
        log::debug!("{} layout updated: {:?}", kind, action);
    }
    let mut body = columns_json(&state, kind).await?;
    body["changed"] = serde_json::Value::Bool(changed);
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, post_json, state};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[test]
    fn test_layout_action_shape() {
        let action: LayoutAction =
            serde_json::from_value(json!({"action": "resize", "id": "shop", "width": 200})).unwrap();
        assert_eq!(
            action,
            LayoutAction::Resize {
                id: "shop".to_string(),
                width: 200
            }
        );
        let action: LayoutAction = serde_json::from_value(json!({"action": "reset"})).unwrap();
        assert_eq!(action, LayoutAction::Reset);
    }

    #[tokio::test]
    async fn test_schema_lists_formats() {
        let (status, body) = get(state(), "/api/columns/accounts").await;
        assert_eq!(status, StatusCode::OK);
        let schema: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(schema["table"], "accounts");
        let balance = schema["columns"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == "amount")
            .unwrap();
        assert_eq!(balance["formats"], json!(["number", "plain", "currency"]));
        assert_eq!(schema["displayOrder"][0], "name");

        let (status, _) = get(state(), "/api/columns/budgets").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_actions_persist_into_repository() {
        let state = state();
        let (status, body) = post_json(
            state.clone(),
            "/api/columns/transactions",
            json!({"action": "resize", "id": "shop", "width": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["changed"], true);
        let shop = body["layout"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == "shop")
            .unwrap();
        assert_eq!(shop["width"], 100);

        let saved = state.repository.read().await.saved_columns(TableKind::Transactions);
        assert_eq!(saved.iter().find(|c| c.id == "shop").map(|c| c.width), Some(100));

        let (_, body) = post_json(
            state.clone(),
            "/api/columns/transactions",
            json!({"action": "toggle", "id": "amount"}),
        )
        .await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["changed"], false);
    }

    #[tokio::test]
    async fn test_concurrent_actions_both_apply() {
        let state = state();
        let (resized, toggled) = tokio::join!(
            post_json(
                state.clone(),
                "/api/columns/transactions",
                json!({"action": "resize", "id": "shop", "width": 300}),
            ),
            post_json(
                state.clone(),
                "/api/columns/transactions",
                json!({"action": "toggle", "id": "notes"}),
            ),
        );
        assert_eq!(resized.0, StatusCode::OK);
        assert_eq!(toggled.0, StatusCode::OK);

        let layout = state.layout(TableKind::Transactions).await.unwrap();
        assert_eq!(layout.state("shop").map(|s| s.width), Some(300));
        assert_eq!(layout.state("notes").map(|s| s.visible), Some(false));

        let saved = state.repository.read().await.saved_columns(TableKind::Transactions);
        assert_eq!(saved.iter().find(|c| c.id == "shop").map(|c| c.width), Some(300));
        assert_eq!(saved.iter().find(|c| c.id == "notes").map(|c| c.visible), Some(false));
    }

    #[tokio::test]
    async fn test_oversized_width_is_capped() {
        let (status, body) = post_json(
            state(),
            "/api/columns/transactions",
            json!({"action": "resize", "id": "occurredOn", "width": u32::MAX}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        let date = body["layout"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == "occurredOn")
            .unwrap();
        assert_eq!(date["width"], moneydesk_grid::column::DEFAULT_MAX_WIDTH);
    }

    #[tokio::test]
    async fn test_failed_action_leaves_layout_untouched() {
        let state = state();
        let before = state.layout(TableKind::Transactions).await.unwrap();
        let (status, _) = post_json(
            state.clone(),
            "/api/columns/transactions",
            json!({"action": "format", "id": "notes", "format": "currency"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.layout(TableKind::Transactions).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_reorder_changes_rendered_header() {
        let state = state();
        let (status, _) = post_json(
            state.clone(),
            "/api/columns/transactions",
            json!({"action": "reorder", "source": "notes", "target": "type"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = get(state, "/api/transactions/columns").await;
        let body: Value = serde_json::from_str(&body).unwrap();
        let order: Vec<&str> = body["displayOrder"]
            .as_array()
            .unwrap()
            .iter()
            .map(|id| id.as_str().unwrap())
            .collect();
        let notes = order.iter().position(|id| *id == "notes").unwrap();
        let kind = order.iter().position(|id| *id == "type").unwrap();
        assert_eq!(notes + 1, kind);
    }

    #[tokio::test]
    async fn test_format_validation() {
        let (status, _) = post_json(
            state(),
            "/api/columns/transactions",
            json!({"action": "format", "id": "amount", "format": "currency"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json(
            state(),
            "/api/columns/transactions",
            json!({"action": "format", "id": "shop", "format": "currency"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("does not support"));

        let (status, _) = post_json(
            state(),
            "/api/columns/transactions",
            json!({"action": "pin", "id": "ghost"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
