//! Card lifecycle service: listing, registering and removing cards

use std::sync::Arc;

use thiserror::Error;

use crate::{
    models::card::{Card, NewCard},
    repository::{CardStore, StoreError},
};

/// Reasons a card operation did not go through. The `Display` text is the
/// message shown to clients.
#[derive(Error, Debug)]
pub enum CardError {
    #[error("The card already exists!")]
    AlreadyExists,

    #[error("Card {id} does not exist.")]
    NotFound { id: i32 },

    #[error("{0}")]
    Invalid(String),

    #[error("Failed to access the card store.")]
    Store(#[source] StoreError),
}

/// Outcome of a card operation, typed per operation
pub type OperationResult<T> = Result<T, CardError>;

fn store_failure(err: StoreError) -> CardError {
    tracing::error!(error = %err, "Card store operation failed");
    CardError::Store(err)
}

#[derive(Clone)]
pub struct CardService {
    store: Arc<dyn CardStore>,
}

impl CardService {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self { store }
    }

    /// List every card
    pub async fn list_cards(&self) -> OperationResult<Vec<Card>> {
        self.store.find_all().await.map_err(store_failure)
    }

    /// Register a new card and return it with its assigned id
    ///
    /// The existence check and the insert are separate store calls; the
    /// store's own uniqueness guard settles concurrent registrations of the
    /// same card.
    pub async fn register_card(&self, candidate: NewCard) -> OperationResult<Card> {
        candidate.check()?;

        let existing = self
            .store
            .find_by_identity(&candidate.name, &candidate.department, candidate.card_type)
            .await
            .map_err(store_failure)?;
        if existing.is_some() {
            return Err(CardError::AlreadyExists);
        }

        let id = match self.store.insert(&candidate).await {
            Ok(id) => id,
            Err(StoreError::Duplicate) => return Err(CardError::AlreadyExists),
            Err(e) => return Err(store_failure(e)),
        };

        tracing::info!(id, name = %candidate.name, card_type = %candidate.card_type, "Card registered");
        Ok(candidate.into_card(id))
    }

    /// Remove a card by id
    pub async fn remove_card(&self, id: i32) -> OperationResult<()> {
        if self.store.find_by_id(id).await.map_err(store_failure)?.is_none() {
            return Err(CardError::NotFound { id });
        }

        // Someone else may have removed it since the lookup
        if !self.store.delete_by_id(id).await.map_err(store_failure)? {
            return Err(CardError::NotFound { id });
        }

        tracing::info!(id, "Card removed");
        Ok(())
    }

    /// Check that the card store is reachable
    pub async fn ping(&self) -> OperationResult<()> {
        self.store.ping().await.map_err(store_failure)
    }
}
