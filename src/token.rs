//! Token Service
//!
//! Issues and verifies HS256-signed JWT bearer tokens whose `sub` claim
//! carries the owner identifier. Keys are derived once and never change.

use crate::config::AppConfig;
use crate::error::TokenError;
use crate::models::TokenClaims;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

/// Bearer token issuer and verifier
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl TokenService {
    /// Create a token service for the given secret, issuer and audience
    pub fn new(secret: &[u8], issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[&audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // Expiry is checked against an explicit instant in `verify_at`
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            audience,
        }
    }

    /// Create a token service from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
        )
    }

    /// Issue a token for `owner_id` that expires `ttl` from now
    pub fn issue(
        &self,
        owner_id: Uuid,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(owner_id, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        owner_id: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = TokenClaims {
            sub: owner_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verify a token and return its owner identifier
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// The token is expired from the `exp` second onward.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn service() -> TokenService {
        TokenService::from_config(&test_config())
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let owner = Uuid::new_v4();

        let token = tokens.issue(owner, Duration::seconds(300)).unwrap();
        assert_eq!(tokens.verify(&token), Ok(owner));
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = service();
        let owner = Uuid::new_v4();
        let issued = Utc::now() - Duration::hours(2);

        let token = tokens
            .issue_at(owner, Duration::seconds(60), issued)
            .unwrap();

        assert_eq!(
            tokens.verify_at(&token, issued + Duration::seconds(59)),
            Ok(owner)
        );
        assert_eq!(
            tokens.verify_at(&token, issued + Duration::seconds(60)),
            Err(TokenError::Expired)
        );
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = service()
            .issue(Uuid::new_v4(), Duration::seconds(300))
            .unwrap();
        let other = TokenService::new(&[b'b'; 32], "test", "test");

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_audience_is_invalid() {
        let token = TokenService::new(&[b'a'; 32], "test", "someone-else")
            .issue(Uuid::new_v4(), Duration::seconds(300))
            .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let tokens = service();
        assert_eq!(tokens.verify(""), Err(TokenError::Invalid));
        assert_eq!(tokens.verify("not.a.jwt"), Err(TokenError::Invalid));

        let token = tokens.issue(Uuid::new_v4(), Duration::seconds(300)).unwrap();
        let tampered = format!("{}x", token);
        assert_eq!(tokens.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "ownerId": Uuid::new_v4(),
            "sub": "not-a-uuid",
            "iat": now,
            "exp": now + 300,
            "iss": "test",
            "aud": "test",
            "jti": Uuid::new_v4(),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&[b'a'; 32]),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let tokens = service();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let first = tokens.issue_at(owner, Duration::seconds(300), now).unwrap();
        let second = tokens.issue_at(owner, Duration::seconds(300), now).unwrap();
        assert_ne!(first, second);
    }
}
