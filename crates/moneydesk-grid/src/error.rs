//! Error types for moneydesk-grid

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Duplicate column id: {id}")]
    DuplicateColumn { id: String },

    #[error("Invalid widths for column {id}: min width {min} exceeds default width {default}")]
    InvalidWidth { id: String, min: u32, default: u32 },

    #[error("Invalid widths for column {id}: default width {default} exceeds max width {max}")]
    WidthAboveMax { id: String, default: u32, max: u32 },

    #[error("Unknown column: {id}")]
    UnknownColumn { id: String },

    #[error("Fetch failed: {message}")]
    Fetch { message: String },
}

impl GridError {
    /// Wrap a collaborator failure as a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        GridError::Fetch {
            message: message.into(),
        }
    }
}

/// Result type with GridError
pub type GridResult<T> = Result<T, GridError>;
