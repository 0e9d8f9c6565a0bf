//! Account Directory
//!
//! Persists and looks up users by login. Login uniqueness is the storage
//! backend's job: `create` is a single insert-if-absent and reports a
//! conflict as `AccountError::DuplicateLogin`.

use crate::error::{AccountError, StorageError};
use crate::models::User;

use async_trait::async_trait;

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Whether a user with this login is registered
    async fn exists(&self, login: &str) -> Result<bool, StorageError>;

    /// Atomically insert a new user unless the login is taken.
    ///
    /// The id is generated by the directory.
    async fn create(&self, login: &str, password_hash: &str) -> Result<User, AccountError>;

    /// Look up a user by login
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError>;
}
