//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: transaction grid, JSON query API, selection summary
//! - routes::accounts: account grid and detail
//! - routes::columns: column layout schema and layout actions
//! - routes::table: request parameters and the shared table fragment

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use moneydesk_config::Config;
use moneydesk_core::{SharedRepository, TableKind};
use moneydesk_grid::{ColumnLayout, RestoreTokenCodec, TableEngine};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub repository: SharedRepository,
    pub config: Config,
    /// Column layout per table, seeded from the dataset's saved layouts
    pub layouts: Arc<RwLock<HashMap<TableKind, ColumnLayout>>>,
}

impl AppState {
    pub fn new(config: Config, repository: SharedRepository) -> Self {
        Self {
            repository,
            config,
            layouts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn codec(&self) -> RestoreTokenCodec {
        RestoreTokenCodec::new(self.config.table.max_page_size, self.config.table.default_page_size)
    }

    /// Current layout of a table, reconciled with its registry on first use
    pub async fn layout(&self, kind: TableKind) -> ApiResult<ColumnLayout> {
        if let Some(layout) = self.layouts.read().await.get(&kind) {
            return Ok(layout.clone());
        }
        let registry = kind.registry()?;
        let saved = self.repository.read().await.saved_columns(kind);
        let layout = ColumnLayout::reconcile(&registry, saved);
        self.layouts.write().await.insert(kind, layout.clone());
        Ok(layout)
    }

    /// Apply `update` to a table layout while holding the layouts lock, so
    /// concurrent updates never overwrite each other.
    ///
    /// The repository copy is refreshed when `update` reports a change. A
    /// failed update leaves the layout untouched.
    pub async fn update_layout<F>(&self, kind: TableKind, update: F) -> ApiResult<bool>
    where
        F: FnOnce(&mut ColumnLayout) -> ApiResult<bool>,
    {
        let mut layouts = self.layouts.write().await;
        let layout = match layouts.entry(kind) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let saved = self.repository.read().await.saved_columns(kind);
                entry.insert(ColumnLayout::reconcile(&kind.registry()?, saved))
            }
        };
        let mut next = layout.clone();
        let changed = update(&mut next)?;
        if changed {
            self.repository
                .write()
                .await
                .save_columns(kind, next.states().to_vec());
            *layout = next;
        }
        Ok(changed)
    }

    /// Fresh engine for one request
    pub async fn engine(&self, kind: TableKind) -> ApiResult<TableEngine> {
        let layout = self.layout(kind).await?;
        let engine = TableEngine::new(
            kind.registry()?,
            kind.builtins(&self.config.currency),
            kind.search_fields(),
        )
        .with_codec(self.codec())
        .with_layout(layout);
        Ok(engine)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{api_account_detail, api_accounts, htmx_accounts_table, page_accounts};
    use routes::columns::{api_columns, api_columns_update, api_transaction_columns};
    use routes::transactions::{
        api_transaction_detail, api_transactions, api_transactions_query, api_transactions_summary,
        htmx_transactions_table, page_transactions,
    };

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stats", get(api_stats))
        .route("/api/reload", post(api_reload))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/query", post(api_transactions_query))
        .route("/api/transactions/columns", get(api_transaction_columns))
        .route("/api/transactions/summary", post(api_transactions_summary))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/accounts", get(api_accounts))
        .route("/api/accounts/:id", get(api_account_detail))
        .route("/api/columns/:table", get(api_columns).post(api_columns_update))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(api)
        // HTMX page routes
        .route("/", get(index_page))
        .route("/transactions", get(page_transactions))
        .route("/accounts", get(page_accounts))
        // HTMX partial routes
        .route("/transactions/table", get(htmx_transactions_table))
        .route("/accounts/table", get(htmx_accounts_table))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn api_stats(state: axum::extract::State<AppState>) -> axum::Json<moneydesk_core::DatasetStats> {
    axum::Json(state.repository.read().await.stats())
}

/// Reload the dataset file
async fn api_reload(state: axum::extract::State<AppState>) -> ApiResult<axum::Json<serde_json::Value>> {
    let stats = {
        let mut repository = state.repository.write().await;
        repository.reload().await?;
        repository.stats()
    };
    // Saved layouts may have changed on disk
    state.layouts.write().await.clear();
    log::info!("Dataset reloaded: {} transactions", stats.transactions);
    Ok(axum::Json(serde_json::json!({
        "success": true,
        "message": "Dataset reloaded",
        "stats": stats,
    })))
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Moneydesk</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
        [data-tooltip-text]:hover::after {{ content: attr(data-tooltip-text); position: absolute; background: #1f2937; color: #fff; padding: 2px 6px; border-radius: 4px; font-size: 11px; white-space: nowrap; z-index: 50; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Overview", "&#128202;"),
        ("/transactions", "Transactions", "&#128203;"),
        ("/accounts", "Accounts", "&#128176;"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Moneydesk</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, icon) in &links {
        let is_active = if *path == "/" {
            current_path == "/"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Overview page with dataset counts
async fn index_page(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let repository = state.repository.read().await;
    let stats = repository.stats();
    let currency = &state.config.currency;
    let decimals = currency.decimal_places as usize;
    let owed: f64 = moneydesk_utils::sum_money(
        repository
            .accounts()
            .iter()
            .filter(|a| a.account_type.is_liability())
            .map(|a| a.balance),
    );
    let held: f64 = moneydesk_utils::sum_money(
        repository
            .accounts()
            .iter()
            .filter(|a| !a.account_type.is_liability())
            .map(|a| a.balance),
    );

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Overview</h2></div>
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Transactions</p><p class='text-2xl font-bold text-indigo-700'>{}</p></div>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Accounts</p><p class='text-2xl font-bold text-blue-700'>{}</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Held</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Owed</p><p class='text-2xl font-bold text-red-700'>{}</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 text-sm text-gray-600'>Data from {} to {}</div>"#,
        stats.transactions,
        stats.accounts,
        moneydesk_utils::format_amount(held, decimals, &currency.thousands_separator),
        moneydesk_utils::format_amount(owed, decimals, &currency.thousands_separator),
        stats.date_range_start.as_deref().unwrap_or("-"),
        stats.date_range_end.as_deref().unwrap_or("-"),
    );

    axum::response::Html(page_response(&headers, "Overview", "/", &inner_content))
}

/// Start the HTTP server
///
/// Binds the configured address and serves until the listener fails.
pub async fn start_server(config: Config, repository: SharedRepository) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, repository);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Moneydesk server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Overview)");
    log::info!("  - /transactions (Transaction grid)");
    log::info!("  - /accounts (Account grid)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_and_index() {
        let (status, body) = get(state(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");

        let (status, body) = get(state(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Moneydesk"));
        assert!(body.contains("3,140.00"));
        assert!(body.contains("-420.50"));
    }

    #[tokio::test]
    async fn test_reload_without_file_fails() {
        let (status, body) = send(
            state(),
            axum::http::Request::post("/api/reload")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("NOT_LOADED"));
    }

    #[tokio::test]
    async fn test_reload_from_file() {
        let (state, path) = loaded_state("reload").await;
        let (status, body) = send(
            state,
            axum::http::Request::post("/api/reload")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"success\":true"));
        std::fs::remove_file(&path).unwrap();
    }
}
