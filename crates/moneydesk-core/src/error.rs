//! Error types for moneydesk-core
//!
//! Dataset loading, record lookups and table registry problems, each with a
//! stable code and a severity so the API layer can pick a status and the log
//! level.

use moneydesk_grid::GridError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotLoaded,
    AccountNotFound,
    TransactionNotFound,
    UnknownTable,
    FileNotFound,
    ParseError,
    IoError,
    TableError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::UnknownTable => write!(f, "UNKNOWN_TABLE"),
            ErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::TableError => write!(f, "TABLE_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  - {}", suggestion)?;
        }
        Ok(())
    }
}

/// Main error type for moneydesk-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Dataset not loaded")]
    NotLoaded,

    #[error("Account not found: {id}")]
    AccountNotFound { id: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Unknown table: {name}")]
    UnknownTable { name: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Table error: {0}")]
    Table(#[from] GridError),
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::UnknownTable { .. } => ErrorCode::UnknownTable,
            CoreError::FileNotFound { .. } => ErrorCode::FileNotFound,
            CoreError::ParseError { .. } => ErrorCode::ParseError,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::Table(_) => ErrorCode::TableError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotLoaded => ErrorSeverity::Warning,
            CoreError::AccountNotFound { .. } | CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::UnknownTable { .. } | CoreError::Table(_) => ErrorSeverity::Warning,
            CoreError::FileNotFound { .. } | CoreError::ParseError { .. } => ErrorSeverity::Error,
            CoreError::IoError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());
        match self {
            CoreError::UnknownTable { .. } => {
                details.with_suggestion("Known tables are 'transactions' and 'accounts'.".to_string())
            }
            CoreError::FileNotFound { path } => details
                .with_detail(serde_json::json!({ "path": path }))
                .with_suggestion("Check data.path and data.dataset_file in the config.".to_string()),
            CoreError::ParseError { message } => details
                .with_detail(serde_json::json!({ "parse_message": message }))
                .with_suggestion("The dataset must be a JSON object with 'transactions' and 'accounts' arrays.".to_string()),
            CoreError::Table(GridError::UnknownColumn { id }) => {
                details.with_suggestion(format!("Column '{}' is not part of this table.", id))
            }
            _ => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<std::io::Error> for CoreError {
    fn from(error: std::io::Error) -> Self {
        CoreError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::ParseError {
            message: error.to_string(),
        }
    }
}
