//! In-process card store

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CardStore, StoreError, StoreResult};
use crate::models::card::{Card, CardType, NewCard};

#[derive(Default)]
struct Inner {
    last_id: i32,
    cards: BTreeMap<i32, Card>,
}

/// Card store kept in memory. Identity uniqueness is checked under the write
/// lock, so concurrent inserts of the same card cannot both succeed.
#[derive(Default)]
pub struct MemoryCardStore {
    inner: RwLock<Inner>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_identity(card: &Card, name: &str, department: &str, card_type: CardType) -> bool {
    card.name == name && card.department == department && card.card_type == card_type
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn find_all(&self) -> StoreResult<Vec<Card>> {
        Ok(self.inner.read().await.cards.values().cloned().collect())
    }

    async fn find_by_identity(
        &self,
        name: &str,
        department: &str,
        card_type: CardType,
    ) -> StoreResult<Option<Card>> {
        let inner = self.inner.read().await;
        Ok(inner
            .cards
            .values()
            .find(|card| same_identity(card, name, department, card_type))
            .cloned())
    }

    async fn insert(&self, card: &NewCard) -> StoreResult<i32> {
        let mut inner = self.inner.write().await;
        if inner
            .cards
            .values()
            .any(|c| same_identity(c, &card.name, &card.department, card.card_type))
        {
            return Err(StoreError::Duplicate);
        }
        inner.last_id += 1;
        let id = inner.last_id;
        inner.cards.insert(id, card.clone().into_card(id));
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Card>> {
        Ok(self.inner.read().await.cards.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: i32) -> StoreResult<bool> {
        Ok(self.inner.write().await.cards.remove(&id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn release(&self) {}
}
