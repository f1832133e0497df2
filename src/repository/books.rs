//! Books repository: read-only catalog identity
//!
//! Catalog CRUD lives in an external collaborator; this repository only
//! resolves book identity for copies being staged, reserved, or described
//! in notification emails.

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookSummary},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Book identity with author names
    pub async fn summary(&self, id: Uuid) -> AppResult<BookSummary> {
        let row = sqlx::query(
            r#"
            SELECT b.id, b.title,
                   COALESCE(
                       array_agg(a.name ORDER BY a.name) FILTER (WHERE a.name IS NOT NULL),
                       '{}'
                   ) AS authors
            FROM books b
            LEFT JOIN book_authors ba ON ba.book_id = b.id
            LEFT JOIN authors a ON a.id = ba.author_id
            WHERE b.id = $1
            GROUP BY b.id, b.title
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        Ok(BookSummary {
            id: row.get("id"),
            title: row.get("title"),
            authors: row.get("authors"),
        })
    }
}
