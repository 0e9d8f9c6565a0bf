//! Data Models
//!
//! Stored entities, request/response DTOs and token claims.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Stored Entities
// ============================================

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Item owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
}

// ============================================
// Request DTOs
// ============================================

/// Registration request.
///
/// Fields are optional so that absent and empty values are reported as
/// `MissingField` rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Item creation request. Any `owner` field in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
}

// ============================================
// Response DTOs
// ============================================

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Created item reference
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims for bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (owner/user ID)
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID
    pub jti: Uuid,
}
