//! PostgreSQL card store

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::{CardStore, StoreError, StoreResult};
use crate::models::card::{Card, CardType, NewCard};

#[derive(Clone)]
pub struct PgCardStore {
    pool: Pool<Postgres>,
}

impl PgCardStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CardRow {
    card_id: i32,
    name: String,
    department: String,
    card_type: String,
}

impl TryFrom<CardRow> for Card {
    type Error = StoreError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let card_type = CardType::from_code(&row.card_type).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "card {} has unknown type code {:?}",
                row.card_id, row.card_type
            ))
        })?;
        Ok(Card {
            id: row.card_id,
            name: row.name,
            department: row.department,
            card_type,
        })
    }
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn find_all(&self) -> StoreResult<Vec<Card>> {
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT card_id, name, department, card_type FROM card ORDER BY card_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Card::try_from).collect()
    }

    async fn find_by_identity(
        &self,
        name: &str,
        department: &str,
        card_type: CardType,
    ) -> StoreResult<Option<Card>> {
        sqlx::query_as::<_, CardRow>(
            r#"
            SELECT card_id, name, department, card_type FROM card
            WHERE name = $1 AND department = $2 AND card_type = $3
            "#,
        )
        .bind(name)
        .bind(department)
        .bind(card_type.code())
        .fetch_optional(&self.pool)
        .await?
        .map(Card::try_from)
        .transpose()
    }

    async fn insert(&self, card: &NewCard) -> StoreResult<i32> {
        let inserted = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO card (name, department, card_type)
            VALUES ($1, $2, $3)
            RETURNING card_id
            "#,
        )
        .bind(&card.name)
        .bind(&card.department)
        .bind(card.card_type.code())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Card>> {
        sqlx::query_as::<_, CardRow>(
            "SELECT card_id, name, department, card_type FROM card WHERE card_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Card::try_from)
        .transpose()
    }

    async fn delete_by_id(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM card WHERE card_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn release(&self) {
        self.pool.close().await;
    }
}
