//! PostgreSQL storage backend.

use crate::accounts::AccountDirectory;
use crate::error::{AccountError, StorageError};
use crate::items::ItemRepository;
use crate::models::{Item, User};

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Open a connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| {
            tracing::error!("Database connection failed: {:?}", e);
            StorageError::Connection(e.to_string())
        })
}

/// Create tables and indexes if they do not exist
pub async fn run_migrations(db: &PgPool) -> Result<(), StorageError> {
    tracing::info!("Running database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            login VARCHAR(255) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    // Owner is a plain reference; users are never deleted
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id UUID PRIMARY KEY,
            owner UUID NOT NULL,
            name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_owner ON items(owner, created_at);")
        .execute(db)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Account Directory over the `users` table
#[derive(Clone)]
pub struct PgAccountDirectory {
    db: PgPool,
}

impl PgAccountDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn exists(&self, login: &str) -> Result<bool, StorageError> {
        let found: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE login = $1)")
            .bind(login)
            .fetch_one(&self.db)
            .await?;
        Ok(found.0)
    }

    async fn create(&self, login: &str, password_hash: &str) -> Result<User, AccountError> {
        // The UNIQUE constraint arbitrates concurrent registrations
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, login, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (login) DO NOTHING
            RETURNING id, login, password_hash
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(login)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(map_insert_error)?;

        user.ok_or(AccountError::DuplicateLogin)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as("SELECT id, login, password_hash FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

fn map_insert_error(err: sqlx::Error) -> AccountError {
    let unique_violation = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);

    if unique_violation {
        AccountError::DuplicateLogin
    } else {
        AccountError::Storage(err.into())
    }
}

/// Item persistence over the `items` table
#[derive(Clone)]
pub struct PgItemRepository {
    db: PgPool,
}

impl PgItemRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO items (id, owner, name) VALUES ($1, $2, $3)")
            .bind(item.id)
            .bind(item.owner)
            .bind(&item.name)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Item>, StorageError> {
        let items = sqlx::query_as(
            "SELECT id, owner, name FROM items WHERE owner = $1 ORDER BY created_at, id",
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }
}
