use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Error type for the HTTP surface
#[derive(Debug)]
pub enum ApiError {
    // Caller errors
    InvalidInput(String),
    NotFound(String),

    // Upstream errors
    BlockchainRpcError(String),

    // Rate limiting
    RateLimitExceeded {
        message: String,
        reset_at: DateTime<Utc>,
        retry_after_secs: u64,
    },

    // Internal errors
    ConfigurationError(String),
    InternalError(String),
}

impl ApiError {
    /// Build a 429 whose retry hint counts down to `reset_at`
    pub fn rate_limited(message: impl Into<String>, reset_at: DateTime<Utc>) -> Self {
        let retry_after_secs = (reset_at - Utc::now()).num_seconds().max(1) as u64;
        ApiError::RateLimitExceeded {
            message: message.into(),
            reset_at,
            retry_after_secs,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BlockchainRpcError(_) => StatusCode::BAD_GATEWAY,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ConfigurationError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BlockchainRpcError(msg) => write!(f, "Blockchain RPC error: {}", msg),
            ApiError::RateLimitExceeded { message, .. } => {
                write!(f, "Rate limit exceeded: {}", message)
            }
            ApiError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response structure for API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut retry_after = None;

        let (error_type, message, details) = match self {
            ApiError::InvalidInput(msg) => ("validation_error", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BlockchainRpcError(msg) => {
                error!("Blockchain RPC error: {}", msg);
                ("blockchain_error", msg, None)
            }
            ApiError::RateLimitExceeded {
                message,
                reset_at,
                retry_after_secs,
            } => {
                retry_after = Some(retry_after_secs);
                let details = serde_json::json!({
                    "retry_after_secs": retry_after_secs,
                    "reset_at": reset_at.to_rfc3339(),
                });
                ("rate_limit_exceeded", message, Some(details))
            }
            ApiError::ConfigurationError(msg) => {
                error!("Configuration error: {}", msg);
                (
                    "configuration_error",
                    "Service misconfigured".to_string(),
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
        };

        let mut response = (status, Json(error_response)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<shared::Error> for ApiError {
    fn from(err: shared::Error) -> Self {
        match err {
            shared::Error::UnsupportedNetwork(_) => ApiError::NotFound(err.to_string()),
            shared::Error::InvalidAddress(_) => ApiError::InvalidInput(err.to_string()),
            shared::Error::EvmRpc(msg) => ApiError::BlockchainRpcError(msg),
            shared::Error::Configuration(msg) => ApiError::ConfigurationError(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
