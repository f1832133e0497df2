//! Cart repository for database operations
//!
//! Cart rows are advisory staging only; no method here touches copy
//! status or takes copy locks.

use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::cart::CartEntry,
};

#[derive(Clone)]
pub struct CartRepository {
    pool: Pool<Postgres>,
}

impl CartRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List a user's cart entries, oldest first
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<CartEntry>> {
        Ok(sqlx::query_as::<_, CartEntry>(
            "SELECT * FROM cart_entries WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// List a user's cart entries inside a checkout transaction
    pub async fn list_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> AppResult<Vec<CartEntry>> {
        Ok(sqlx::query_as::<_, CartEntry>(
            "SELECT * FROM cart_entries WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?)
    }

    /// Count a user's cart entries
    pub async fn count(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM cart_entries WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Whether the user has already staged this copy
    pub async fn exists(&self, user_id: Uuid, copy_id: Uuid) -> AppResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM cart_entries WHERE user_id = $1 AND copy_id = $2)",
        )
        .bind(user_id)
        .bind(copy_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Insert a cart entry. A unique-violation on (user_id, copy_id)
    /// surfaces as `DuplicateEntry`, closing the concurrent double-add
    /// window the advisory exists-check leaves open.
    pub async fn insert(&self, user_id: Uuid, copy_id: Uuid) -> AppResult<CartEntry> {
        sqlx::query_as::<_, CartEntry>(
            "INSERT INTO cart_entries (id, user_id, copy_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(copy_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry(copy_id)
            }
            _ => AppError::Database(e),
        })
    }

    /// Remove one entry. Returns the number of rows deleted.
    pub async fn delete(&self, user_id: Uuid, copy_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM cart_entries WHERE user_id = $1 AND copy_id = $2")
                .bind(user_id)
                .bind(copy_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Remove all of a user's entries. Idempotent.
    pub async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM cart_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove all of a user's entries inside the checkout transaction, so
    /// a committed checkout can never leave entries behind to resurrect
    /// already-reserved copies.
    pub async fn clear_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM cart_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
