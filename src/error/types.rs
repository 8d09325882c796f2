use std::fmt;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::adapters::AdapterError;
use crate::blockchain::EthereumError;

#[derive(Debug, Clone)]
pub enum AppError {
    BlockchainError(String),
    ConfigError(String),
    ValidationError(String),
    NotFound(String),
    TransactionError(String),
    Timeout(String),
    ExternalServiceError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BlockchainError(msg) => write!(f, "Blockchain error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            AppError::ExternalServiceError(msg) => write!(f, "External service error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::TransactionError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::BlockchainError(_) | AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalServiceError(format!("HTTP request error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

impl From<AdapterError> for AppError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::InvalidData(msg) => AppError::ValidationError(msg),
            AdapterError::UnknownToken(msg) => AppError::NotFound(msg),
            AdapterError::TransactionRejected(msg) => AppError::TransactionError(msg),
            AdapterError::NotReady(msg) => AppError::Timeout(msg),
            other => AppError::BlockchainError(other.to_string()),
        }
    }
}

impl From<EthereumError> for AppError {
    fn from(err: EthereumError) -> Self {
        match err {
            EthereumError::InvalidAddress(msg) => AppError::ValidationError(msg),
            other => AppError::BlockchainError(other.to_string()),
        }
    }
}
