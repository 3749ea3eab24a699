//! Error types for moneydesk-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moneydesk_core::{CoreError, ErrorCode, ErrorSeverity};
use moneydesk_grid::GridError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error")]
    InternalError,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(error) => match error.code() {
                ErrorCode::AccountNotFound
                | ErrorCode::TransactionNotFound
                | ErrorCode::UnknownTable
                | ErrorCode::FileNotFound => StatusCode::NOT_FOUND,
                ErrorCode::TableError => StatusCode::BAD_REQUEST,
                ErrorCode::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ParseError | ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Core errors log at their own severity; other client errors stay at debug
    pub fn log_level(&self) -> log::Level {
        match self {
            ApiError::Core(error) => match error.severity() {
                ErrorSeverity::Info => log::Level::Debug,
                ErrorSeverity::Warning => log::Level::Warn,
                ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
            },
            ApiError::InternalError => log::Level::Error,
            ApiError::NotFound { .. } | ApiError::BadRequest { .. } => log::Level::Debug,
        }
    }
}

impl From<GridError> for ApiError {
    fn from(error: GridError) -> Self {
        ApiError::Core(CoreError::Table(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        log::log!(self.log_level(), "{} ({})", self, status);
        let body = match &self {
            ApiError::Core(error) => serde_json::json!({ "error": error.to_details() }),
            other => serde_json::json!({ "error": { "message": other.to_string() } }),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ApiError::from(CoreError::TransactionNotFound { id: "t1".to_string() });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let column = ApiError::from(GridError::UnknownColumn { id: "x".to_string() });
        assert_eq!(column.status(), StatusCode::BAD_REQUEST);

        assert_eq!(ApiError::bad_request("nope").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(CoreError::NotLoaded).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_log_level_follows_severity() {
        let missing = ApiError::from(CoreError::TransactionNotFound { id: "t1".to_string() });
        assert_eq!(missing.log_level(), log::Level::Debug);
        assert_eq!(ApiError::from(CoreError::NotLoaded).log_level(), log::Level::Warn);
        let column = ApiError::from(GridError::UnknownColumn { id: "x".to_string() });
        assert_eq!(column.log_level(), log::Level::Warn);
        let io = ApiError::from(CoreError::IoError { message: "disk".to_string() });
        assert_eq!(io.log_level(), log::Level::Error);
        assert_eq!(ApiError::InternalError.log_level(), log::Level::Error);
        assert_eq!(ApiError::bad_request("nope").log_level(), log::Level::Debug);
    }
}
