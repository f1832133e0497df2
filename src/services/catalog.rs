//! Copy inventory accessors and provisioning
//!
//! Book and author records themselves are owned by the external catalog;
//! this service only manages the physical copies attached to them.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::copy::{BookCopy, CopyCondition},
    repository::Repository,
};

/// Upper bound on copies created per provisioning call.
const MAX_PROVISION_COUNT: u32 = 100;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a single copy by ID
    pub async fn get_copy(&self, id: Uuid) -> AppResult<BookCopy> {
        self.repository.copies.get_by_id(id).await
    }

    /// List all copies of a book
    pub async fn list_copies_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookCopy>> {
        // Verify the book exists so an unknown id is a 404, not an empty list
        self.repository.books.get_by_id(book_id).await?;
        self.repository.copies.list_by_book(book_id).await
    }

    /// Bulk-provision identical copies of a book.
    pub async fn provision_copies(
        &self,
        book_id: Uuid,
        count: u32,
        condition: CopyCondition,
        notes: Option<&str>,
    ) -> AppResult<Vec<BookCopy>> {
        if count == 0 || count > MAX_PROVISION_COUNT {
            return Err(AppError::Validation(format!(
                "copy count must be between 1 and {}",
                MAX_PROVISION_COUNT
            )));
        }

        self.repository.books.get_by_id(book_id).await?;
        let created = self
            .repository
            .copies
            .bulk_create(book_id, count, condition, notes)
            .await?;
        tracing::info!(%book_id, count = created.len(), "copies provisioned");
        Ok(created)
    }

    /// Delete a copy, refusing while it is staged in a cart or attached
    /// to an open reservation.
    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        // Distinguish "missing" from "referenced" for the caller.
        self.repository.copies.get_by_id(id).await?;

        let deleted = self.repository.copies.delete_unreferenced(id).await?;
        if !deleted {
            return Err(AppError::Conflict(format!(
                "Copy {} is staged or attached to an open reservation",
                id
            )));
        }
        tracing::info!(copy_id = %id, "copy deleted");
        Ok(())
    }
}
