//! Route modules for the API server
//!
//! Each grid screen follows the same structure:
//! - mod.rs: module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: full page and HTMX fragment rendering
//!
//! `table` holds the request parsing and fragment rendering both grids share;
//! `columns` serves column schemas and layout actions for any table.

pub mod accounts;
pub mod columns;
pub mod table;
pub mod transactions;
