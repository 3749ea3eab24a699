//! In-memory dataset of accounts and transactions, loaded from a JSON file

use crate::columns::TableKind;
use crate::error::{CoreError, CoreResult};
use crate::models::{Account, Transaction};
use async_trait::async_trait;
use moneydesk_grid::value::locale_cmp;
use moneydesk_grid::{ColumnState, GridError, GridResult, RowSource, SearchController, TableState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Dataset file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Saved column layouts keyed by table name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub columns: HashMap<String, Vec<ColumnState>>,
}

impl Dataset {
    pub fn from_json(content: &str) -> CoreResult<Self> {
        let mut dataset: Dataset = serde_json::from_str(content)?;
        dataset.transactions = dataset
            .transactions
            .into_iter()
            .map(Transaction::with_totals)
            .collect();
        Ok(dataset)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    pub transactions: usize,
    pub accounts: usize,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
}

/// Shared handle used by the row sources and the HTTP layer
pub type SharedRepository = Arc<RwLock<Repository>>;

#[derive(Debug, Default)]
pub struct Repository {
    data: Dataset,
    source: Option<PathBuf>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(data: Dataset) -> Self {
        Self { data, source: None }
    }

    pub fn shared(self) -> SharedRepository {
        Arc::new(RwLock::new(self))
    }

    /// Load the dataset from a JSON file
    pub async fn load(&mut self, path: PathBuf) -> CoreResult<()> {
        if !path.exists() {
            return Err(CoreError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let content = tokio::fs::read_to_string(&path).await?;
        self.data = Dataset::from_json(&content)?;
        self.source = Some(path);

        let stats = self.stats();
        log::info!(
            "Loaded {} transactions and {} accounts",
            stats.transactions,
            stats.accounts
        );
        Ok(())
    }

    /// Reload from the file used by the last successful load
    pub async fn reload(&mut self) -> CoreResult<()> {
        match self.source.clone() {
            Some(path) => self.load(path).await,
            None => Err(CoreError::NotLoaded),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.data.transactions
    }

    pub fn accounts(&self) -> &[Account] {
        &self.data.accounts
    }

    pub fn transaction(&self, id: &str) -> CoreResult<&Transaction> {
        self.data
            .transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })
    }

    pub fn account(&self, id: &str) -> CoreResult<&Account> {
        self.data
            .accounts
            .iter()
            .find(|a| a.id == id || a.name == id)
            .ok_or_else(|| CoreError::AccountNotFound { id: id.to_string() })
    }

    /// Transactions touching an account, by name, newest first
    pub fn transactions_by_account(&self, account: &str) -> Vec<&Transaction> {
        let mut rows: Vec<&Transaction> = self
            .data
            .transactions
            .iter()
            .filter(|t| {
                t.account.as_deref() == Some(account) || t.to_account.as_deref() == Some(account)
            })
            .collect();
        rows.sort_by(|a, b| locale_cmp(&b.occurred_on, &a.occurred_on));
        rows
    }

    pub fn saved_columns(&self, kind: TableKind) -> Vec<ColumnState> {
        self.data
            .columns
            .get(kind.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn save_columns(&mut self, kind: TableKind, columns: Vec<ColumnState>) {
        self.data.columns.insert(kind.as_str().to_string(), columns);
    }

    pub fn stats(&self) -> DatasetStats {
        let range = self
            .data
            .transactions
            .iter()
            .filter_map(|t| t.date())
            .fold((None, None), |(min, max), date| {
                (
                    Some(min.map_or(date, |m: chrono::NaiveDate| m.min(date))),
                    Some(max.map_or(date, |m: chrono::NaiveDate| m.max(date))),
                )
            });
        DatasetStats {
            transactions: self.data.transactions.len(),
            accounts: self.data.accounts.len(),
            date_range_start: range.0.map(|d| d.to_string()),
            date_range_end: range.1.map(|d| d.to_string()),
        }
    }
}

fn search_rows<R: Clone + moneydesk_grid::Record>(rows: &[R], kind: TableKind, term: &str) -> Vec<R> {
    let search = SearchController::with_state(term, None);
    rows.iter()
        .filter(|row| search.matches(*row, kind.search_fields()))
        .cloned()
        .collect()
}

fn not_loaded(kind: TableKind) -> GridError {
    GridError::fetch(format!("{} are not loaded", kind))
}

/// Serves transaction rows out of a shared repository
#[derive(Debug, Clone)]
pub struct TransactionSource {
    repository: SharedRepository,
}

impl TransactionSource {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RowSource for TransactionSource {
    type Row = Transaction;

    async fn fetch_columns(&self) -> GridResult<Vec<ColumnState>> {
        Ok(self.repository.read().await.saved_columns(TableKind::Transactions))
    }

    async fn fetch_rows(&self, state: TableState) -> GridResult<Vec<Transaction>> {
        let repository = self.repository.read().await;
        if !repository.is_loaded() {
            return Err(not_loaded(TableKind::Transactions));
        }
        Ok(search_rows(
            repository.transactions(),
            TableKind::Transactions,
            &state.search_term,
        ))
    }
}

/// Serves account rows out of a shared repository
#[derive(Debug, Clone)]
pub struct AccountSource {
    repository: SharedRepository,
}

impl AccountSource {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RowSource for AccountSource {
    type Row = Account;

    async fn fetch_columns(&self) -> GridResult<Vec<ColumnState>> {
        Ok(self.repository.read().await.saved_columns(TableKind::Accounts))
    }

    async fn fetch_rows(&self, state: TableState) -> GridResult<Vec<Account>> {
        let repository = self.repository.read().await;
        if !repository.is_loaded() {
            return Err(not_loaded(TableKind::Accounts));
        }
        Ok(search_rows(repository.accounts(), TableKind::Accounts, &state.search_term))
    }
}
