//! Authentication Middleware
//!
//! Bearer token verification in front of the item routes.

use crate::error::ApiError;
use crate::extractors::Principal;
use crate::handlers::AppState;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Require an authenticated principal
///
/// Verifies the bearer token from the Authorization header and stores the
/// resulting `Principal` in request extensions for handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let owner = state.gateway.authorize(auth_header).map_err(|e| {
        tracing::debug!(path = %req.uri().path(), "Rejected request: {}", e);
        ApiError::Token(e)
    })?;

    req.extensions_mut().insert(Principal(owner));

    Ok(next.run(req).await)
}
