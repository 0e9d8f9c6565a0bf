//! Request Extractors

use crate::error::{ApiError, TokenError};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Owner identifier of the caller, taken from a verified bearer token only.
///
/// Inserted by `require_auth`; a route outside that layer gets `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or(ApiError::Token(TokenError::Missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_principal_from_extensions() {
        let owner = Uuid::new_v4();
        let mut parts = parts();
        parts.extensions.insert(Principal(owner));

        let principal = Principal::from_request_parts(&mut parts, &()).await;
        assert_eq!(principal.ok(), Some(Principal(owner)));
    }

    #[tokio::test]
    async fn test_bearer_header_alone_is_not_trusted() {
        let mut parts = parts();
        parts
            .headers
            .insert("authorization", "Bearer anything".parse().unwrap());

        let err = Principal::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Token(TokenError::Missing)));
    }
}
