//! Transaction routes - data grid, restore-token queries, selection summary
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: full page and the HTMX table fragment

pub mod api;
pub mod page;

pub use api::{api_transaction_detail, api_transactions, api_transactions_query, api_transactions_summary};
pub use page::{htmx_transactions_table, page_transactions};
