//! Item Store
//!
//! Owner-scoped item persistence. The owner passed in always comes from a
//! verified token; nothing here reads an owner from request data.

use crate::error::{ItemError, StorageError, ValidationError};
use crate::models::Item;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence port for items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Store a new item in a single write
    async fn insert(&self, item: &Item) -> Result<(), StorageError>;

    /// All items whose owner equals `owner`, in insertion order
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Item>, StorageError>;
}

/// Item creation and owner-filtered listing
#[derive(Clone)]
pub struct ItemStore {
    repo: Arc<dyn ItemRepository>,
}

impl ItemStore {
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self { repo }
    }

    /// Create an item for `owner`.
    ///
    /// Fails with `EmptyName` when the name is absent or empty.
    pub async fn create(&self, owner: Uuid, name: Option<&str>) -> Result<Item, ItemError> {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ValidationError::EmptyName.into()),
        };

        let item = Item {
            id: Uuid::new_v4(),
            owner,
            name: name.to_string(),
        };

        self.repo.insert(&item).await?;

        tracing::info!(item_id = %item.id, owner = %owner, "Item created");
        Ok(item)
    }

    /// List the items owned by `owner`
    pub async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Item>, StorageError> {
        self.repo.find_by_owner(owner).await
    }
}
