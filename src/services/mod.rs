//! Business logic services

pub mod cards;

use std::sync::Arc;

use crate::repository::CardStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub cards: cards::CardService,
}

impl Services {
    /// Create all services on top of the given card store
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self {
            cards: cards::CardService::new(store),
        }
    }
}
