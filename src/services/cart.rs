//! Cart management service
//!
//! The cart is a short-lived staging area. Adding a copy checks its
//! current status but takes no lock, so availability can change between
//! staging and checkout; the checkout's inventory lock check is what
//! finally decides.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{cart::CartEntryDetails, copy::CopyStatus},
    repository::Repository,
};

/// Maximum number of live cart entries per user.
pub const CART_CAPACITY: usize = 5;

#[derive(Clone)]
pub struct CartService {
    repository: Repository,
}

impl CartService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Stage a copy in the user's cart.
    pub async fn add(&self, user_id: Uuid, copy_id: Uuid) -> AppResult<CartEntryDetails> {
        let copy = self.repository.copies.get_by_id(copy_id).await?;

        if copy.status != CopyStatus::Available {
            tracing::warn!(%user_id, %copy_id, status = ?copy.status, "add to cart: copy not available");
            return Err(AppError::CopyNotAvailable(copy_id));
        }

        let count = self.repository.cart.count(user_id).await?;
        if count as usize >= CART_CAPACITY {
            tracing::warn!(%user_id, count, "add to cart: cart full");
            return Err(AppError::CartFull {
                limit: CART_CAPACITY,
            });
        }

        if self.repository.cart.exists(user_id, copy_id).await? {
            return Err(AppError::DuplicateEntry(copy_id));
        }

        let entry = self.repository.cart.insert(user_id, copy_id).await?;
        tracing::info!(%user_id, %copy_id, "copy staged in cart");

        let mut details = self.repository.copies.details_by_ids(&[copy_id]).await?;
        let copy = details
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", copy_id)))?;

        Ok(CartEntryDetails {
            copy,
            added_at: entry.created_at,
        })
    }

    /// Remove a staged copy.
    pub async fn remove(&self, user_id: Uuid, copy_id: Uuid) -> AppResult<()> {
        let deleted = self.repository.cart.delete(user_id, copy_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!(
                "Copy {} is not in the cart",
                copy_id
            )));
        }
        tracing::info!(%user_id, %copy_id, "copy removed from cart");
        Ok(())
    }

    /// List the user's cart with copy and book details.
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<CartEntryDetails>> {
        let entries = self.repository.cart.list(user_id).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let copy_ids: Vec<Uuid> = entries.iter().map(|e| e.copy_id).collect();
        let details = self.repository.copies.details_by_ids(&copy_ids).await?;

        // Preserve staging order.
        let mut result = Vec::with_capacity(entries.len());
        for entry in &entries {
            if let Some(copy) = details.iter().find(|c| c.id == entry.copy_id) {
                result.push(CartEntryDetails {
                    copy: copy.clone(),
                    added_at: entry.created_at,
                });
            }
        }
        Ok(result)
    }

    /// Empty the user's cart. Idempotent: clearing an empty cart is a
    /// no-op, not an error.
    pub async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        self.repository.cart.clear(user_id).await?;
        tracing::info!(%user_id, "cart cleared");
        Ok(())
    }
}
