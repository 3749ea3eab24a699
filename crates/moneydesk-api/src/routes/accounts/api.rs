//! Accounts API endpoints

use crate::error::{ApiError, ApiResult};
use crate::routes::table::{prepare, table_response, Params};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use moneydesk_core::{Account, TableKind, Transaction};
use serde::Serialize;

/// Accounts page (JSON API); same parameters as the transactions endpoint
pub async fn api_accounts(state: State<AppState>, params: Query<Params>) -> ApiResult<Json<serde_json::Value>> {
    let mut engine = state.engine(TableKind::Accounts).await?;
    let repository = state.repository.read().await;
    let rows = repository.accounts();
    let cleared = prepare(&mut engine, &state.codec(), &params, rows)?;
    let response = table_response(&engine, rows, cleared);
    serde_json::to_value(&response).map(Json).map_err(|e| {
        log::error!("failed to serialize accounts page: {}", e);
        ApiError::InternalError
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail<'a> {
    #[serde(flatten)]
    pub account: &'a Account,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_credit: Option<f64>,
    pub transactions: Vec<&'a Transaction>,
}

/// Single account by id or name, with its transactions newest first
pub async fn api_account_detail(state: State<AppState>, path: Path<String>) -> ApiResult<Json<serde_json::Value>> {
    let repository = state.repository.read().await;
    let account = repository.account(&path.0)?;
    let detail = AccountDetail {
        account,
        available_credit: account.available_credit(),
        transactions: repository.transactions_by_account(&account.name),
    };
    serde_json::to_value(&detail)
        .map(Json)
        .map_err(|_| ApiError::InternalError)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, state};
    use axum::http::StatusCode;
    use serde_json::Value;

    async fn get_json(uri: &str) -> Value {
        let (status, body) = get(state(), uri).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        serde_json::from_str(&body).unwrap()
    }

    fn names(page: &Value) -> Vec<&str> {
        page["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_accounts_sorted_by_balance() {
        let page = get_json("/api/accounts?sort=amount:desc").await;
        assert_eq!(names(&page), vec!["Checking", "Wallet", "Visa"]);
        assert_eq!(page["total"], 3);
    }

    #[tokio::test]
    async fn test_accounts_owner_filter() {
        let page = get_json("/api/accounts?person=Ben").await;
        assert_eq!(names(&page), vec!["Wallet"]);
    }

    #[tokio::test]
    async fn test_account_detail_by_name() {
        let detail = get_json("/api/accounts/Visa").await;
        assert_eq!(detail["id"], "a1");
        assert_eq!(detail["availableCredit"], 1579.5);
        let ids: Vec<&str> = detail["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["t2", "t1", "t4"]);

        let (status, body) = get(state(), "/api/accounts/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("ACCOUNT_NOT_FOUND"));
    }
}
