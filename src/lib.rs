//! Item Keeper
//!
//! A small HTTP service providing:
//! - Account registration with atomic duplicate-login prevention
//! - Argon2id password hashing
//! - Login issuing short-lived JWT bearer tokens
//! - Owner-scoped item creation and listing
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `TOKEN_TTL_SECONDS` - Token lifetime in seconds (default: 300)
//! - `JWT_ISSUER` - JWT issuer claim (default: "item-keeper")
//! - `JWT_AUDIENCE` - JWT audience claim (default: "item-keeper-api")
//! - `ARGON2_MEMORY_COST` - Argon2id memory cost in KiB (default: 65536)
//! - `ARGON2_TIME_COST` - Argon2id iterations (default: 3)
//! - `ARGON2_PARALLELISM` - Argon2id lanes (default: 4)
//! - `DATABASE_URL` - PostgreSQL connection string (in-memory storage when unset)
//! - `DATABASE_MAX_CONNECTIONS` - Connection pool size (default: 10)
//! - `LISTEN_ADDR` - Socket address to bind (default: "0.0.0.0:8080")
//! - `LOG_LEVEL` - Default tracing level when `RUST_LOG` is unset (default: "info")
//!
//! # Usage
//!
//! ```rust,ignore
//! use item_keeper::{create_app, AppConfig, AppState, Storage};
//!
//! let config = AppConfig::from_env()?;
//! config.validate()?;
//! let storage = Storage::from_config(&config).await?;
//! let app = create_app(AppState::new(&config, storage)?);
//! ```

pub mod accounts;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod items;
pub mod middleware;
pub mod models;
pub mod password;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use accounts::AccountDirectory;
pub use config::AppConfig;
pub use error::{
    AccountError, ApiError, ConfigError, ItemError, StorageError, TokenError, ValidationError,
};
pub use extractors::Principal;
pub use gateway::AuthGateway;
pub use handlers::AppState;
pub use items::{ItemRepository, ItemStore};
pub use models::*;
pub use password::CredentialHasher;
pub use storage::Storage;
pub use token::TokenService;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router with request tracing
pub fn create_app(state: AppState) -> Router {
    handlers::create_routes(state).layer(TraceLayer::new_for_http())
}
