//! Accounts HTML page and its HTMX table fragment

use crate::error::ApiResult;
use crate::routes::table::{prepare, render_container, render_fragment, render_toolbar, Params, TableTarget, TABLE_SCRIPT};
use crate::{page_response, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use moneydesk_core::TableKind;
use moneydesk_utils::escape_html;

const TARGET: TableTarget<'static> = TableTarget {
    table_id: "accounts",
    endpoint: "/accounts/table",
};

async fn fragment(state: &AppState, params: &Params) -> ApiResult<(String, String)> {
    let mut engine = state.engine(TableKind::Accounts).await?;
    let repository = state.repository.read().await;
    let rows = repository.accounts();
    prepare(&mut engine, &state.codec(), params, rows)?;
    let html = render_fragment(&engine, rows, TARGET, &state.config.table, &state.config.currency);
    Ok((html, engine.search().current().to_string()))
}

/// Accounts page (HTMX)
pub async fn page_accounts(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<Params>,
) -> ApiResult<Html<String>> {
    let (table, term) = fragment(&state, &params).await?;

    // Shortcuts into the transactions grid filtered by account
    let shortcuts: String = state
        .repository
        .read()
        .await
        .accounts()
        .iter()
        .map(|account| {
            format!(
                "<a href='/transactions?account={}' class='px-3 py-1 text-sm rounded-full border text-indigo-600 hover:bg-indigo-50'>{}</a>",
                urlencoding::encode(&account.name),
                escape_html(&account.name)
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Accounts</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            {}
            {}
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-sm font-semibold text-gray-500 mb-3'>Transactions by account</h3>
            <div class='flex flex-wrap gap-2'>{}</div>
        </div>
        {}"#,
        render_toolbar(TARGET, &term, "Search name, owner, institution...", state.config.table.debounce_ms),
        render_container(TARGET, &table),
        shortcuts,
        TABLE_SCRIPT
    );

    Ok(Html(page_response(&headers, "Accounts", "/accounts", &inner_content)))
}

/// Accounts table fragment (HTMX partial)
pub async fn htmx_accounts_table(state: State<AppState>, params: Query<Params>) -> ApiResult<Html<String>> {
    let (table, _) = fragment(&state, &params).await?;
    Ok(Html(table))
}
