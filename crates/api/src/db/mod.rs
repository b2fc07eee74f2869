//! Data access for users, stores and products.
//!
//! Handlers talk to the [`Repository`] trait only. Two backends implement it:
//!
//! - [`PgRepository`] - `PostgreSQL` through a shared `sqlx` pool
//! - [`MemoryRepository`] - process-local tables, used by tests and for
//!   running the service without a database
//!
//! # Database schema
//!
//! ## Tables
//!
//! - `users` - `email` is unique
//! - `stores` - `user_id` is unique (one store per user), references `users`
//! - `products` - `store_id` references `stores`
//!
//! Foreign keys restrict deletes: a user that owns a store, or a store that
//! lists products, cannot be deleted.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p storekeep-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storekeep_core::{CoerceError, ProductId, StoreId, UserId};

use crate::models::{
    NewProduct, NewStore, NewUser, Product, ProductDetail, ProductPatch, Store, StoreDetail,
    StorePatch, User, UserPatch,
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The record to read, update or delete does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The input cannot be stored: missing field, bad coercion, or a
    /// reference to a record that does not exist.
    #[error("{0}")]
    Invalid(String),
}

impl From<CoerceError> for RepositoryError {
    fn from(err: CoerceError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Abstract store of users, stores and products.
///
/// Implementations enforce email uniqueness, one store per user and the
/// foreign-key relationships atomically.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError>;

    /// All users, by ascending id.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the user does not exist.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the user does not exist, and
    /// `RepositoryError::Invalid` if the user still owns a store.
    async fn delete_user(&self, id: UserId) -> Result<(), RepositoryError>;

    /// The store owned by a user, if any.
    async fn find_store_by_owner(&self, user_id: UserId)
    -> Result<Option<Store>, RepositoryError>;

    /// Insert a store.
    ///
    /// Returns `RepositoryError::Conflict` if the user already owns a store,
    /// `RepositoryError::Invalid` if the user does not exist.
    async fn create_store(&self, new: NewStore) -> Result<Store, RepositoryError>;

    /// A store with its owner and products.
    async fn get_store(&self, id: StoreId) -> Result<Option<StoreDetail>, RepositoryError>;

    async fn update_store(&self, id: StoreId, patch: StorePatch)
    -> Result<Store, RepositoryError>;

    /// Returns `RepositoryError::Invalid` if the store still lists products.
    async fn delete_store(&self, id: StoreId) -> Result<(), RepositoryError>;

    /// Returns `RepositoryError::Invalid` if the store does not exist.
    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError>;

    /// All products with store and owner, by ascending id.
    async fn list_products(&self) -> Result<Vec<ProductDetail>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError>;

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RepositoryError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
