//! Auth Gateway
//!
//! Registration and login flows on top of the Account Directory, the
//! Credential Hasher and the Token Service, plus the bearer-header
//! authorization decision used by the item routes.

use crate::accounts::AccountDirectory;
use crate::error::{ApiError, TokenError, ValidationError};
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, User};
use crate::password::CredentialHasher;
use crate::token::TokenService;

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;
use validator::ValidateEmail;

/// Registration, login and token checks
pub struct AuthGateway {
    accounts: Arc<dyn AccountDirectory>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenService>,
    token_ttl: Duration,
}

impl AuthGateway {
    pub fn new(
        accounts: Arc<dyn AccountDirectory>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            accounts,
            hasher: Arc::new(hasher),
            tokens,
            token_ttl,
        }
    }

    /// Token lifetime handed out on login
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new account. No token is issued.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, ApiError> {
        let (login, password) = validate_registration(req)?;

        // Argon2 is CPU-bound; keep it off the async workers
        let hasher = self.hasher.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let user = self.accounts.create(&login, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate and issue a bearer token.
    ///
    /// Unknown logins and wrong passwords fail identically.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, ApiError> {
        let (login, password) = match (req.login, req.password) {
            (Some(login), Some(password)) if !login.is_empty() && !password.is_empty() => {
                (login, password)
            }
            _ => return Err(ApiError::InvalidCredentials),
        };

        let user = self
            .accounts
            .find_by_login(&login)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let hasher = self.hasher.clone();
        let stored_hash = user.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await?;

        if !verified {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, self.token_ttl).map_err(|e| {
            tracing::error!("Token signing failed: {:?}", e);
            ApiError::Internal
        })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl.num_seconds(),
        })
    }

    // ============================================
    // Authorization
    // ============================================

    /// Resolve the principal from an `Authorization` header value
    pub fn authorize(&self, header: Option<&str>) -> Result<Uuid, TokenError> {
        authorize_bearer(&self.tokens, header)
    }
}

/// Check presence, then email syntax. Returns the owned login and password.
fn validate_registration(req: RegisterRequest) -> Result<(String, String), ValidationError> {
    let login = req
        .login
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField("login"))?;
    let password = req
        .password
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField("password"))?;

    if !login.validate_email() {
        return Err(ValidationError::InvalidLoginFormat);
    }

    Ok((login, password))
}

/// Verify a `Bearer <token>` header value
pub fn authorize_bearer(tokens: &TokenService, header: Option<&str>) -> Result<Uuid, TokenError> {
    let header = header.ok_or(TokenError::Missing)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(TokenError::Invalid)?;

    tokens.verify(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::storage::memory::MemoryAccountDirectory;

    fn gateway() -> AuthGateway {
        let config = test_config();
        AuthGateway::new(
            Arc::new(MemoryAccountDirectory::new()),
            CredentialHasher::from_config(&config).unwrap(),
            Arc::new(TokenService::from_config(&config)),
            Duration::seconds(config.token_ttl),
        )
    }

    fn register_req(login: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            login: Some(login.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login_req(login: &str, password: &str) -> LoginRequest {
        LoginRequest {
            login: Some(login.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let gateway = gateway();
        let user = gateway.register(register_req("a@x.com", "p1")).await.unwrap();

        assert_eq!(user.login, "a@x.com");
        assert_ne!(user.password_hash, "p1");
        assert!(gateway.hasher.verify("p1", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let gateway = gateway();

        let cases = [
            (RegisterRequest::default(), "login"),
            (
                RegisterRequest {
                    login: Some(String::new()),
                    password: Some("p1".into()),
                },
                "login",
            ),
            (
                RegisterRequest {
                    login: Some("a@x.com".into()),
                    password: None,
                },
                "password",
            ),
            (register_req("a@x.com", ""), "password"),
        ];

        for (req, field) in cases {
            let err = gateway.register(req).await.unwrap_err();
            assert!(matches!(
                err,
                ApiError::Validation(ValidationError::MissingField(f)) if f == field
            ));
        }
    }

    #[tokio::test]
    async fn test_register_rejects_non_email_login() {
        let err = gateway()
            .register(register_req("not-an-email", "p1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidLoginFormat)
        ));
    }

    #[tokio::test]
    async fn test_register_twice_is_already_exists() {
        let gateway = gateway();
        gateway.register(register_req("a@x.com", "p1")).await.unwrap();

        let err = gateway
            .register(register_req("a@x.com", "p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyExists));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_succeeds_once() {
        let gateway = Arc::new(gateway());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = gateway.clone();
                tokio::spawn(async move { gateway.register(register_req("race@x.com", "p1")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(ApiError::AlreadyExists) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user_id() {
        let gateway = gateway();
        let user = gateway.register(register_req("a@x.com", "p1")).await.unwrap();

        let response = gateway.login(login_req("a@x.com", "p1")).await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 300);

        let header = format!("Bearer {}", response.token);
        assert_eq!(gateway.authorize(Some(&header)), Ok(user.id));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let gateway = gateway();
        gateway.register(register_req("a@x.com", "p1")).await.unwrap();

        let unknown = gateway.login(login_req("z@x.com", "any")).await.unwrap_err();
        let wrong = gateway.login(login_req("a@x.com", "nope")).await.unwrap_err();
        let missing = gateway.login(LoginRequest::default()).await.unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, ApiError::InvalidCredentials));
        assert!(matches!(wrong, ApiError::InvalidCredentials));
        assert!(matches!(missing, ApiError::InvalidCredentials));
    }

    #[test]
    fn test_authorize_header_shapes() {
        let gateway = gateway();

        assert_eq!(gateway.authorize(None), Err(TokenError::Missing));
        assert_eq!(
            gateway.authorize(Some("Basic abc")),
            Err(TokenError::Invalid)
        );
        assert_eq!(gateway.authorize(Some("Bearer ")), Err(TokenError::Invalid));
        assert_eq!(
            gateway.authorize(Some("Bearer garbage")),
            Err(TokenError::Invalid)
        );
    }
}
