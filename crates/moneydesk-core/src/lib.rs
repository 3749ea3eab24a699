//! Finance records, per-table column registries and the dataset repository

pub mod columns;
pub mod error;
pub mod models;
pub mod repository;
pub mod types;

pub use columns::TableKind;
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::{Account, Transaction};
pub use repository::{AccountSource, Dataset, DatasetStats, Repository, SharedRepository, TransactionSource};
pub use types::{AccountStatus, AccountType, TransactionType};
