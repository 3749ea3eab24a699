//! Transactions HTML page and its HTMX table fragment

use crate::error::ApiResult;
use crate::routes::table::{prepare, render_container, render_fragment, render_toolbar, Params, TableTarget, TABLE_SCRIPT};
use crate::{page_response, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use moneydesk_core::TableKind;

const TARGET: TableTarget<'static> = TableTarget {
    table_id: "transactions",
    endpoint: "/transactions/table",
};

async fn fragment(state: &AppState, params: &Params) -> ApiResult<(String, String)> {
    let mut engine = state.engine(TableKind::Transactions).await?;
    let repository = state.repository.read().await;
    let rows = repository.transactions();
    prepare(&mut engine, &state.codec(), params, rows)?;
    let html = render_fragment(&engine, rows, TARGET, &state.config.table, &state.config.currency);
    Ok((html, engine.search().current().to_string()))
}

/// Transactions page (HTMX)
pub async fn page_transactions(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<Params>,
) -> ApiResult<Html<String>> {
    let (table, term) = fragment(&state, &params).await?;
    let count = state.repository.read().await.transactions().len();

    let inner_content = format!(
        r#"<div class='mb-6 flex items-end justify-between'>
            <div><h2 class='text-2xl font-bold'>Transactions</h2><p class='text-sm text-gray-500'>{} records</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            {}
            {}
        </div>
        {}"#,
        count,
        render_toolbar(TARGET, &term, "Search shop, category, person, notes...", state.config.table.debounce_ms),
        render_container(TARGET, &table),
        TABLE_SCRIPT
    );

    Ok(Html(page_response(&headers, "Transactions", "/transactions", &inner_content)))
}

/// Transactions table fragment (HTMX partial)
pub async fn htmx_transactions_table(state: State<AppState>, params: Query<Params>) -> ApiResult<Html<String>> {
    let (table, _) = fragment(&state, &params).await?;
    Ok(Html(table))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_page_renders_grid() {
        let (status, body) = get(state(), "/transactions").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("id='transactions-container'"));
        assert!(body.contains("id='transactions-search'"));
        assert!(body.contains("delay:250ms"));
        assert!(body.contains("Market"));
    }

    #[tokio::test]
    async fn test_fragment_follows_search() {
        let (status, body) = get(state(), "/transactions/table?q=cafe").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<!DOCTYPE html>"));
        assert!(body.contains("Cafe"));
        assert!(!body.contains("Refund Desk"));
    }

    #[tokio::test]
    async fn test_fragment_rejects_unknown_filter() {
        let (status, _) = get(state(), "/transactions/table?clear_filter=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
