//! HTTP Handlers
//!
//! Registration, login and owner-scoped item endpoints.

use crate::config::AppConfig;
use crate::error::{ApiError, ConfigError, ValidationError};
use crate::extractors::Principal;
use crate::gateway::AuthGateway;
use crate::items::ItemStore;
use crate::middleware;
use crate::models::*;
use crate::password::CredentialHasher;
use crate::storage::Storage;
use crate::token::TokenService;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AuthGateway>,
    pub items: ItemStore,
}

impl AppState {
    /// Wire components from configuration and a storage backend
    pub fn new(config: &AppConfig, storage: Storage) -> Result<Self, ConfigError> {
        let hasher = CredentialHasher::from_config(config)
            .map_err(|e| ConfigError::invalid("ARGON2_MEMORY_COST", e.to_string()))?;
        let tokens = Arc::new(TokenService::from_config(config));

        let gateway = AuthGateway::new(
            storage.accounts,
            hasher,
            tokens,
            Duration::seconds(config.token_ttl),
        );

        Ok(Self {
            gateway: Arc::new(gateway),
            items: ItemStore::new(storage.items),
        })
    }
}

// ============================================
// Route Builder
// ============================================

/// Create all routes
pub fn create_routes(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/items", post(create_item).get(list_items))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}

/// Parse a JSON body regardless of its content type.
///
/// An empty body or invalid JSON is a malformed body.
fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::MalformedBody);
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ValidationError::MalformedBody
    })
}

// ============================================
// Accounts
// ============================================

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: RegisterRequest = json_body(&body)?;

    state.gateway.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful")),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: LoginRequest = json_body(&body)?;

    let response = state.gateway.login(req).await?;

    Ok(Json(response))
}

// ============================================
// Items
// ============================================

/// POST /items
pub async fn create_item(
    State(state): State<AppState>,
    Principal(owner): Principal,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: CreateItemRequest = json_body(&body)?;

    let item = state.items.create(owner, req.name.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: item.id })))
}

/// GET /items
pub async fn list_items(
    State(state): State<AppState>,
    Principal(owner): Principal,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.items.list_by_owner(owner).await?;
    Ok(Json(items))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
