//! Storage backends
//!
//! PostgreSQL for deployments, an in-memory backend for tests and local runs
//! without a database. Both implement the same ports.

pub mod memory;
pub mod postgres;

use crate::accounts::AccountDirectory;
use crate::config::AppConfig;
use crate::error::StorageError;
use crate::items::ItemRepository;

use std::sync::Arc;

/// Account and item persistence handles
#[derive(Clone)]
pub struct Storage {
    pub accounts: Arc<dyn AccountDirectory>,
    pub items: Arc<dyn ItemRepository>,
}

impl Storage {
    /// Process-local storage
    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(memory::MemoryAccountDirectory::new()),
            items: Arc::new(memory::MemoryItemRepository::new()),
        }
    }

    /// PostgreSQL storage over an existing pool
    pub fn postgres(db: sqlx::PgPool) -> Self {
        Self {
            accounts: Arc::new(postgres::PgAccountDirectory::new(db.clone())),
            items: Arc::new(postgres::PgItemRepository::new(db)),
        }
    }

    /// Build the backend selected by configuration, running migrations
    /// when PostgreSQL is used
    pub async fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        match &config.database_url {
            Some(url) => {
                let db = postgres::connect(url, config.database_max_connections).await?;
                postgres::run_migrations(&db).await?;
                Ok(Self::postgres(db))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage");
                Ok(Self::memory())
            }
        }
    }
}
