//! Book copies repository: the copy inventory
//!
//! All status reads that precede a write happen under a row-level
//! `FOR UPDATE` lock scoped to the caller's transaction, so concurrent
//! reservation attempts against the same copy serialize at the lock and
//! the loser observes the winner's committed status.

use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        copy::{BookCopy, CopyCondition, CopyDetails, CopyStatus},
    },
};

/// Column list for `book_copies` queries.
const COLUMNS: &str = "id, book_id, condition, status, notes, created_at, updated_at";

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID (unlocked read)
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookCopy> {
        let query = format!("SELECT {COLUMNS} FROM book_copies WHERE id = $1");
        sqlx::query_as::<_, BookCopy>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    /// List all copies of a book
    pub async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookCopy>> {
        let query = format!(
            "SELECT {COLUMNS} FROM book_copies WHERE book_id = $1 ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, BookCopy>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Acquire the copy's exclusive row lock for the duration of the
    /// ambient transaction and return its current state.
    ///
    /// Blocks until the lock is granted. The caller decides what the
    /// observed status means; no retry happens here.
    pub async fn lock_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<BookCopy> {
        let query = format!("SELECT {COLUMNS} FROM book_copies WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, BookCopy>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    /// Set the status of a set of copies. Bumps `updated_at` on every row.
    pub async fn set_status_many(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[Uuid],
        status: CopyStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE book_copies SET status = $1, updated_at = NOW() WHERE id = ANY($2)")
            .bind(status)
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Set the status of every copy attached to a reservation.
    pub async fn set_status_for_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        status: CopyStatus,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE book_copies
            SET status = $1, updated_at = NOW()
            FROM reservation_copies
            WHERE reservation_copies.copy_id = book_copies.id
              AND reservation_copies.reservation_id = $2
            "#,
        )
        .bind(status)
        .bind(reservation_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Bulk-provision `count` copies of a book in one transaction.
    pub async fn bulk_create(
        &self,
        book_id: Uuid,
        count: u32,
        condition: CopyCondition,
        notes: Option<&str>,
    ) -> AppResult<Vec<BookCopy>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let query = format!(
                "INSERT INTO book_copies (id, book_id, condition, status, notes) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {COLUMNS}"
            );
            let copy = sqlx::query_as::<_, BookCopy>(&query)
                .bind(Uuid::new_v4())
                .bind(book_id)
                .bind(condition)
                .bind(CopyStatus::Available)
                .bind(notes)
                .fetch_one(&mut *tx)
                .await?;
            created.push(copy);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Delete a copy unless it is staged in a cart or attached to an open
    /// reservation. Returns whether a row was deleted.
    pub async fn delete_unreferenced(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM book_copies bc
            WHERE bc.id = $1
              AND NOT EXISTS (SELECT 1 FROM cart_entries ce WHERE ce.copy_id = bc.id)
              AND NOT EXISTS (
                  SELECT 1
                  FROM reservation_copies rc
                  JOIN reservations r ON r.id = rc.reservation_id
                  WHERE rc.copy_id = bc.id AND r.status IN ('pending', 'approved')
              )
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Copies joined with book identity and author names.
    pub async fn details_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<CopyDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT bc.id, bc.condition, bc.status, bc.notes,
                   b.id AS book_id, b.title,
                   COALESCE(
                       array_agg(a.name ORDER BY a.name) FILTER (WHERE a.name IS NOT NULL),
                       '{}'
                   ) AS authors
            FROM book_copies bc
            JOIN books b ON b.id = bc.book_id
            LEFT JOIN book_authors ba ON ba.book_id = b.id
            LEFT JOIN authors a ON a.id = ba.author_id
            WHERE bc.id = ANY($1)
            GROUP BY bc.id, bc.condition, bc.status, bc.notes, b.id, b.title
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Self::details_from_row).collect())
    }

    /// Copies with book identity for a set of reservations, keyed by
    /// reservation id so callers can group them.
    pub async fn details_by_reservation_ids(
        &self,
        reservation_ids: &[Uuid],
    ) -> AppResult<Vec<(Uuid, CopyDetails)>> {
        let rows = sqlx::query(
            r#"
            SELECT rc.reservation_id,
                   bc.id, bc.condition, bc.status, bc.notes,
                   b.id AS book_id, b.title,
                   COALESCE(
                       array_agg(a.name ORDER BY a.name) FILTER (WHERE a.name IS NOT NULL),
                       '{}'
                   ) AS authors
            FROM reservation_copies rc
            JOIN book_copies bc ON bc.id = rc.copy_id
            JOIN books b ON b.id = bc.book_id
            LEFT JOIN book_authors ba ON ba.book_id = b.id
            LEFT JOIN authors a ON a.id = ba.author_id
            WHERE rc.reservation_id = ANY($1)
            GROUP BY rc.reservation_id, bc.id, bc.condition, bc.status, bc.notes, b.id, b.title
            ORDER BY b.title
            "#,
        )
        .bind(reservation_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let reservation_id: Uuid = row.get("reservation_id");
                (reservation_id, Self::details_from_row(row))
            })
            .collect())
    }

    fn details_from_row(row: sqlx::postgres::PgRow) -> CopyDetails {
        CopyDetails {
            id: row.get("id"),
            condition: row.get("condition"),
            status: row.get("status"),
            notes: row.get("notes"),
            book: BookSummary {
                id: row.get("book_id"),
                title: row.get("title"),
                authors: row.get("authors"),
            },
        }
    }
}
