//! Physical book copy model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::BookSummary;

/// Availability state of a physical copy
///
/// Transitions happen only inside reservation-lifecycle transactions while
/// holding the copy's row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Available,
    Reserved,
    Borrowed,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Reserved => "reserved",
            CopyStatus::Borrowed => "borrowed",
        }
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(CopyStatus::Available),
            "reserved" => Ok(CopyStatus::Reserved),
            "borrowed" => Ok(CopyStatus::Borrowed),
            _ => Err(format!("Invalid copy status: {}", s)),
        }
    }
}

// SQLx conversion for CopyStatus (stored as varchar)
impl sqlx::Type<Postgres> for CopyStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for CopyStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Condition grade assigned at provisioning time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CopyCondition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl CopyCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyCondition::New => "new",
            CopyCondition::LikeNew => "like_new",
            CopyCondition::Good => "good",
            CopyCondition::Fair => "fair",
            CopyCondition::Poor => "poor",
        }
    }
}

impl std::str::FromStr for CopyCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(CopyCondition::New),
            "like_new" => Ok(CopyCondition::LikeNew),
            "good" => Ok(CopyCondition::Good),
            "fair" => Ok(CopyCondition::Fair),
            "poor" => Ok(CopyCondition::Poor),
            _ => Err(format!("Invalid copy condition: {}", s)),
        }
    }
}

// SQLx conversion for CopyCondition (stored as varchar)
impl sqlx::Type<Postgres> for CopyCondition {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for CopyCondition {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyCondition {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Book copy model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: Uuid,
    pub book_id: Uuid,
    pub condition: CopyCondition,
    pub status: CopyStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Copy joined with its book identity for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CopyDetails {
    pub id: Uuid,
    pub condition: CopyCondition,
    pub status: CopyStatus,
    pub notes: Option<String>,
    pub book: BookSummary,
}

/// Bulk provisioning request: create `count` identical copies of a book
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProvisionCopiesRequest {
    /// Number of copies to create (1..=100)
    pub count: u32,
    /// Condition grade applied to every created copy
    pub condition: CopyCondition,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [CopyStatus::Available, CopyStatus::Reserved, CopyStatus::Borrowed] {
            assert_eq!(status.as_str().parse::<CopyStatus>().unwrap(), status);
        }
        assert!("lost".parse::<CopyStatus>().is_err());
    }

    #[test]
    fn condition_round_trips_through_strings() {
        for condition in [
            CopyCondition::New,
            CopyCondition::LikeNew,
            CopyCondition::Good,
            CopyCondition::Fair,
            CopyCondition::Poor,
        ] {
            assert_eq!(condition.as_str().parse::<CopyCondition>().unwrap(), condition);
        }
    }
}
