//! Transactions API endpoints - JSON table queries and record lookups
//!
//! Endpoints:
//! - api_transactions: one table page for a restore token plus overrides
//! - api_transactions_query: same, with the state posted as JSON
//! - api_transactions_summary: selection totals for a list of ids
//! - api_transaction_detail: single transaction with its cashback formula

use crate::error::{ApiError, ApiResult};
use crate::routes::table::{prepare, table_response, Params};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use moneydesk_core::{TableKind, Transaction};
use moneydesk_grid::{SelectionState, SelectionSummary, TableState};
use serde::{Deserialize, Serialize};

async fn query_table(state: &AppState, params: &Params) -> ApiResult<serde_json::Value> {
    let mut engine = state.engine(TableKind::Transactions).await?;
    let codec = state.codec();
    let repository = state.repository.read().await;
    let rows = repository.transactions();
    let cleared = prepare(&mut engine, &codec, params, rows)?;
    let response = table_response(&engine, rows, cleared);
    serde_json::to_value(&response).map_err(|e| {
        log::error!("failed to serialize transactions page: {}", e);
        ApiError::InternalError
    })
}

/// Transactions page (JSON API)
///
/// Query: `token`, `q`, `page`, `pageSize`, `sort=id:dir,...` and the
/// filter parameters. A malformed token silently falls back to defaults.
pub async fn api_transactions(
    state: State<AppState>,
    params: Query<Params>,
) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(query_table(&state, &params).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub token: Option<String>,
    /// Takes precedence over `token`
    pub state: Option<TableState>,
    /// Same overrides the GET endpoint accepts
    pub params: Params,
}

/// Transactions page for a posted state (JSON API)
pub async fn api_transactions_query(
    state: State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut params = request.params;
    let token = match request.state {
        Some(table_state) => Some(state.codec().encode(&table_state)),
        None => request.token,
    };
    if let Some(token) = token {
        params.insert("token".to_string(), token);
    }
    Ok(Json(query_table(&state, &params).await?))
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub ids: Vec<String>,
}

/// Selection totals (JSON API); unknown ids are ignored
pub async fn api_transactions_summary(
    state: State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Json<SelectionSummary> {
    let repository = state.repository.read().await;
    let mut selection = SelectionState::new();
    for id in &request.ids {
        selection.toggle_row(id, true);
    }
    selection.prune(repository.transactions().iter().map(|t| t.id.as_str()));
    Json(selection.summary(repository.transactions()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail<'a> {
    #[serde(flatten)]
    pub transaction: &'a Transaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashback_formula: Option<String>,
}

/// Single transaction (JSON API)
pub async fn api_transaction_detail(
    state: State<AppState>,
    path: Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let repository = state.repository.read().await;
    let transaction = repository.transaction(&path.0)?;
    let detail = TransactionDetail {
        transaction,
        cashback_formula: transaction.cashback_formula(),
    };
    serde_json::to_value(&detail)
        .map(Json)
        .map_err(|_| ApiError::InternalError)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, post_json, state};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    async fn get_json(uri: &str) -> Value {
        let (status, body) = get(state(), uri).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        serde_json::from_str(&body).unwrap()
    }

    fn ids(page: &Value) -> Vec<String> {
        page["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_default_page() {
        let page = get_json("/api/transactions").await;
        assert_eq!(page["total"], 4);
        assert_eq!(page["pageSize"], 5);
        assert_eq!(page["options"]["types"], json!(["Expense", "Income", "Transfer"]));
        assert!(!page["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_filter_keeps_type_options() {
        let page = get_json("/api/transactions?types=Expense").await;
        assert_eq!(page["total"], 2);
        assert_eq!(page["options"]["types"], json!(["Expense", "Income", "Transfer"]));
        assert_eq!(page["state"]["filters"]["types"], json!(["Expense"]));
    }

    #[tokio::test]
    async fn test_sort_and_date_filters() {
        let page = get_json("/api/transactions?sort=amount:desc").await;
        assert_eq!(ids(&page), vec!["t4", "t2", "t1", "t3"]);

        let page = get_json("/api/transactions?year=2024&month=1&sort=occurredOn:asc").await;
        assert_eq!(ids(&page), vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_token_round_trip_and_garbage() {
        let first = get_json("/api/transactions?shop=Cafe").await;
        let token = first["token"].as_str().unwrap().to_string();
        let again = get_json(&format!("/api/transactions?token={}", token)).await;
        assert_eq!(ids(&again), vec!["t2"]);

        let fallback = get_json("/api/transactions?token=garbage").await;
        assert_eq!(fallback["total"], 4);
    }

    #[tokio::test]
    async fn test_search_clear_and_restore() {
        let searched = get_json("/api/transactions?q=market").await;
        assert_eq!(ids(&searched), vec!["t1"]);
        let token = searched["token"].as_str().unwrap().to_string();

        let cleared = get_json(&format!("/api/transactions?token={}&search_action=clear", token)).await;
        assert_eq!(cleared["total"], 4);
        assert_eq!(cleared["search"]["previous"], "market");
        assert_eq!(cleared["search"]["canRestore"], true);

        let token = cleared["token"].as_str().unwrap().to_string();
        let restored = get_json(&format!(
            "/api/transactions?token={}&prev=market&search_action=restore",
            token
        ))
        .await;
        assert_eq!(restored["search"]["term"], "market");
        assert_eq!(restored["total"], 1);
    }

    #[tokio::test]
    async fn test_sort_click_on_unknown_column() {
        let (status, body) = get(state(), "/api/transactions?sort_click=ghost").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("TABLE_ERROR"));
    }

    #[tokio::test]
    async fn test_posted_state() {
        let (status, body) = post_json(
            state(),
            "/api/transactions/query",
            json!({
                "state": {
                    "sort": [{"id": "amount", "direction": "asc"}],
                    "filters": {"person": "Ana"},
                    "pagination": {"page": 1, "pageSize": 5}
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let page: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(ids(&page), vec!["t3", "t1", "t4"]);
    }

    #[tokio::test]
    async fn test_selection_summary() {
        let (status, body) = post_json(
            state(),
            "/api/transactions/summary",
            json!({"ids": ["t1", "t2", "t3", "missing"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let summary: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["count"], 3);
        assert_eq!(summary["amount"], 30.5);
    }

    #[tokio::test]
    async fn test_detail() {
        let detail = get_json("/api/transactions/t1").await;
        assert_eq!(detail["shop"], "Market");
        assert_eq!(detail["cashbackFormula"], "10.00 x 5% = 0.50");

        let (status, _) = get(state(), "/api/transactions/t99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
