//! Repository layer: the card store boundary
//!
//! [`CardStore`] is the contract the card service consumes. Every failure is
//! returned as a [`StoreError`] so callers can always produce an outcome.

pub mod cards;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::{
    config::{DatabaseConfig, StoreBackend},
    models::card::{Card, CardType, NewCard},
};

pub use cards::PgCardStore;
pub use memory::MemoryCardStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A card with the same name, department and type is already stored
    #[error("Duplicate card")]
    Duplicate,

    #[error("Corrupt card row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence gateway for cards. Implementations must be safe under
/// concurrent calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardStore: Send + Sync {
    /// All cards ordered by id
    async fn find_all(&self) -> StoreResult<Vec<Card>>;

    async fn find_by_identity(
        &self,
        name: &str,
        department: &str,
        card_type: CardType,
    ) -> StoreResult<Option<Card>>;

    /// Insert a card and return the id assigned to it
    async fn insert(&self, card: &NewCard) -> StoreResult<i32>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Card>>;

    /// Returns whether a row was removed
    async fn delete_by_id(&self, id: i32) -> StoreResult<bool>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> StoreResult<()>;

    /// Release underlying connections at shutdown
    async fn release(&self);
}

/// Open the configured card store
pub async fn connect(config: &DatabaseConfig) -> StoreResult<Arc<dyn CardStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory card store, data will not survive a restart");
            Ok(Arc::new(MemoryCardStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .connect(&config.url)
                .await?;

            tracing::info!("Connected to database");

            if config.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| StoreError::Database(e.into()))?;
                tracing::info!("Database migrations completed");
            }

            Ok(Arc::new(PgCardStore::new(pool)))
        }
    }
}
