//! Account routes - data grid and account detail
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: full page and the HTMX table fragment

pub mod api;
pub mod page;

pub use api::{api_account_detail, api_accounts};
pub use page::{htmx_accounts_table, page_accounts};
