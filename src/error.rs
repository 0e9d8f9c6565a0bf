//! Error Types
//!
//! Typed errors for each component plus the HTTP-facing `ApiError` that
//! renders every failure as a status code and a short JSON reason.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Malformed or missing client input. Always mapped to `400`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Login must be a valid email address")]
    InvalidLoginFormat,

    #[error("Item name is missing")]
    EmptyName,

    #[error("Request body is missing or is not valid JSON")]
    MalformedBody,
}

/// Bearer token rejections. Always mapped to `401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Authentication required")]
    Missing,

    #[error("Invalid token")]
    Invalid,

    #[error("Token has expired")]
    Expired,
}

/// Persistence layer failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage connection failed: {0}")]
    Connection(String),

    #[error("storage query failed: {0}")]
    Query(String),
}

/// Account Directory errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("Login is already registered")]
    DuplicateLogin,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Item Store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Startup configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced over HTTP
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal error")]
    Internal,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::AlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::Token(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Storage(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(ValidationError::MissingField(_)) => "missing_field",
            ApiError::Validation(ValidationError::InvalidLoginFormat) => "invalid_login_format",
            ApiError::Validation(ValidationError::EmptyName) => "empty_name",
            ApiError::Validation(ValidationError::MalformedBody) => "malformed_body",
            ApiError::Token(TokenError::Missing) => "missing_token",
            ApiError::Token(TokenError::Invalid) => "invalid_token",
            ApiError::Token(TokenError::Expired) => "token_expired",
            ApiError::AlreadyExists => "already_exists",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Storage(_) | ApiError::Internal => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Driver messages stay in the logs
            ApiError::Storage(_) | ApiError::Internal => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        (
            self.status(),
            Json(serde_json::json!({
                "error": self.code(),
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateLogin => ApiError::AlreadyExists,
            AccountError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::Validation(e) => ApiError::Validation(e),
            ItemError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::Io(e) => StorageError::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StorageError::Connection(err.to_string())
            }
            other => StorageError::Query(other.to_string()),
        }
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        ApiError::Internal
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Blocking task failed: {:?}", err);
        ApiError::Internal
    }
}
