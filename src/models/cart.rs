//! Cart entry model and related types
//!
//! Cart membership is advisory: staging a copy does not lock it. A staged
//! copy can lose availability to another user's checkout; that is detected
//! at checkout time by the inventory lock check, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::copy::CopyDetails;

/// Cart entry from database, unique per (user, copy)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub copy_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Cart entry with copy and book identity for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartEntryDetails {
    pub copy: CopyDetails,
    pub added_at: DateTime<Utc>,
}

/// Add-to-cart request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartEntryRequest {
    pub copy_id: Uuid,
}
