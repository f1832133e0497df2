//! Reservation model, status state machine and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::copy::CopyDetails;
use super::user::UserSummary;

/// Reservation lifecycle status
///
/// Legal transitions: `pending -> approved | rejected`,
/// `approved -> returned`. `rejected` and `returned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Returned => "returned",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (ReservationStatus::Pending, ReservationStatus::Approved)
                | (ReservationStatus::Pending, ReservationStatus::Rejected)
                | (ReservationStatus::Approved, ReservationStatus::Returned)
        )
    }

    /// Copy status implied by a reservation entering this status.
    ///
    /// Isolated as a pure function so the mapping is testable without the
    /// transaction plumbing around it.
    pub fn target_copy_status(self) -> super::copy::CopyStatus {
        use super::copy::CopyStatus;
        match self {
            ReservationStatus::Pending => CopyStatus::Reserved,
            ReservationStatus::Approved => CopyStatus::Borrowed,
            ReservationStatus::Rejected | ReservationStatus::Returned => CopyStatus::Available,
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "approved" => Ok(ReservationStatus::Approved),
            "rejected" => Ok(ReservationStatus::Rejected),
            "returned" => Ok(ReservationStatus::Returned),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

// SQLx conversion for ReservationStatus (stored as varchar)
impl sqlx::Type<Postgres> for ReservationStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for ReservationStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ReservationStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Reservation row from database
///
/// Suggested timeslots are kept as the RFC 3339 strings the client sent;
/// they are parsed only for validation and email rendering.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pickup_time: Option<DateTime<Utc>>,
    pub return_time: Option<DateTime<Utc>>,
    pub status: ReservationStatus,
    pub suggested_pickup_timeslots: Vec<String>,
    pub suggested_return_timeslots: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reservation with user and copy details populated
///
/// This is also the read-only snapshot handed to the notification
/// dispatcher after commit; the dispatcher cannot reach back into
/// lifecycle state through it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationDetails {
    pub id: Uuid,
    pub user: UserSummary,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pickup_time: Option<DateTime<Utc>>,
    pub return_time: Option<DateTime<Utc>>,
    pub status: ReservationStatus,
    pub suggested_pickup_timeslots: Vec<String>,
    pub suggested_return_timeslots: Vec<String>,
    pub copies: Vec<CopyDetails>,
    pub created_at: DateTime<Utc>,
}

/// Checkout request: converts the caller's cart into a reservation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Proposed half-hour pickup windows, RFC 3339 start timestamps
    #[validate(length(min = 1, message = "at least one pickup timeslot is required"))]
    pub suggested_pickup_timeslots: Vec<String>,
    /// Proposed half-hour return windows, RFC 3339 start timestamps
    #[validate(length(min = 1, message = "at least one return timeslot is required"))]
    pub suggested_return_timeslots: Vec<String>,
}

/// Admin status-update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReservationStatusRequest {
    pub status: ReservationStatus,
    /// Confirmed pickup time, required when approving
    pub pickup_time: Option<DateTime<Utc>>,
    /// Confirmed return time, required when approving
    pub return_time: Option<DateTime<Utc>>,
}

/// Admin listing filters
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReservationFilters {
    /// Case-insensitive substring match on the user's email
    pub email: Option<String>,
    pub status: Option<ReservationStatus>,
    /// Case-insensitive substring match on any reserved book's title
    pub book_title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::copy::CopyStatus;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Approved));
        assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Rejected));
    }

    #[test]
    fn approved_can_only_be_returned() {
        assert!(ReservationStatus::Approved.can_transition_to(ReservationStatus::Returned));
        assert!(!ReservationStatus::Approved.can_transition_to(ReservationStatus::Rejected));
        assert!(!ReservationStatus::Approved.can_transition_to(ReservationStatus::Pending));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for terminal in [ReservationStatus::Rejected, ReservationStatus::Returned] {
            for next in [
                ReservationStatus::Pending,
                ReservationStatus::Approved,
                ReservationStatus::Rejected,
                ReservationStatus::Returned,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_on_pending_is_rejected() {
        assert!(!ReservationStatus::Pending.can_transition_to(ReservationStatus::Pending));
    }

    #[test]
    fn returned_on_pending_is_illegal() {
        assert!(!ReservationStatus::Pending.can_transition_to(ReservationStatus::Returned));
    }

    #[test]
    fn copy_status_mapping() {
        assert_eq!(
            ReservationStatus::Pending.target_copy_status(),
            CopyStatus::Reserved
        );
        assert_eq!(
            ReservationStatus::Approved.target_copy_status(),
            CopyStatus::Borrowed
        );
        assert_eq!(
            ReservationStatus::Rejected.target_copy_status(),
            CopyStatus::Available
        );
        assert_eq!(
            ReservationStatus::Returned.target_copy_status(),
            CopyStatus::Available
        );
    }
}
