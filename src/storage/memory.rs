//! In-memory storage backend.
//!
//! Login uniqueness is enforced under a single write lock, which makes
//! `create` an atomic insert-if-absent just like the PostgreSQL constraint.

use crate::accounts::AccountDirectory;
use crate::error::{AccountError, StorageError};
use crate::items::ItemRepository;
use crate::models::{Item, User};

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Users keyed by login
#[derive(Default)]
pub struct MemoryAccountDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    async fn exists(&self, login: &str) -> Result<bool, StorageError> {
        Ok(self.users.read().await.contains_key(login))
    }

    async fn create(&self, login: &str, password_hash: &str) -> Result<User, AccountError> {
        let mut users = self.users.write().await;

        match users.entry(login.to_string()) {
            Entry::Occupied(_) => Err(AccountError::DuplicateLogin),
            Entry::Vacant(slot) => {
                let user = User {
                    id: Uuid::new_v4(),
                    login: login.to_string(),
                    password_hash: password_hash.to_string(),
                };
                Ok(slot.insert(user).clone())
            }
        }
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.read().await.get(login).cloned())
    }
}

/// Items in insertion order
#[derive(Default)]
pub struct MemoryItemRepository {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), StorageError> {
        self.items.write().await.push(item.clone());
        Ok(())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Item>, StorageError> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.owner == owner)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_find() {
        let directory = MemoryAccountDirectory::new();

        assert!(!directory.exists("a@x.com").await.unwrap());
        let user = directory.create("a@x.com", "hash").await.unwrap();

        assert!(directory.exists("a@x.com").await.unwrap());
        assert_eq!(
            directory.find_by_login("a@x.com").await.unwrap(),
            Some(user)
        );
        assert_eq!(directory.find_by_login("b@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_login_is_rejected() {
        let directory = MemoryAccountDirectory::new();
        let first = directory.create("a@x.com", "hash-1").await.unwrap();

        assert_eq!(
            directory.create("a@x.com", "hash-2").await,
            Err(AccountError::DuplicateLogin)
        );
        // The original record is untouched
        assert_eq!(
            directory.find_by_login("a@x.com").await.unwrap(),
            Some(first)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_succeeds_once() {
        let directory = Arc::new(MemoryAccountDirectory::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let directory = directory.clone();
                tokio::spawn(async move {
                    directory.create("race@x.com", &format!("hash-{i}")).await
                })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AccountError::DuplicateLogin) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 31);
    }
}
