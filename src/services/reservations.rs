//! Reservation lifecycle service
//!
//! The orchestrator for checkout and status transitions. Every multi-step
//! operation runs inside a single database transaction using row-level
//! pessimistic locks; there is no optimistic retry loop. Notification
//! dispatch happens strictly after commit and can never roll anything
//! back.

use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::CopyStatus,
        reservation::{
            CreateReservationRequest, Reservation, ReservationDetails, ReservationFilters,
            ReservationStatus, UpdateReservationStatusRequest,
        },
        user::UserSummary,
    },
    repository::Repository,
    services::notifications::{NotificationDispatcher, ReservationEvent},
    services::timeslots,
};

/// Maximum copies a user may hold across pending and approved
/// reservations.
pub const ACTIVE_ITEM_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    dispatcher: NotificationDispatcher,
}

impl ReservationsService {
    pub fn new(repository: Repository, dispatcher: NotificationDispatcher) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Checkout: convert the user's cart into a pending reservation.
    ///
    /// Runs entirely inside one transaction. The user row is locked
    /// before the active-item count so concurrent checkouts by the same
    /// user serialize instead of racing past the cap; copy rows are then
    /// locked in sorted order and verified available. Any failure rolls
    /// the whole transaction back: no partial copy-status changes, no
    /// partial cart clearing.
    pub async fn create_reservation(
        &self,
        user_id: Uuid,
        request: &CreateReservationRequest,
    ) -> AppResult<ReservationDetails> {
        if request.end_date <= request.start_date {
            return Err(AppError::Validation(
                "end date must be after start date".to_string(),
            ));
        }

        let mut tx = self.repository.pool.begin().await?;

        let entries = self.repository.cart.list_in_tx(&mut tx, user_id).await?;
        if entries.is_empty() {
            return Err(AppError::EmptyCart);
        }

        self.repository.users.lock_for_update(&mut tx, user_id).await?;

        let active = self
            .repository
            .reservations
            .count_active_copies(&mut tx, user_id)
            .await?;
        if active + entries.len() as i64 > ACTIVE_ITEM_LIMIT {
            return Err(AppError::ActiveLimitExceeded {
                active,
                requested: entries.len(),
                limit: ACTIVE_ITEM_LIMIT,
            });
        }

        // Sorted lock order keeps overlapping checkouts from deadlocking.
        let mut copy_ids: Vec<Uuid> = entries.iter().map(|e| e.copy_id).collect();
        copy_ids.sort_unstable();

        for &copy_id in &copy_ids {
            let copy = self.repository.copies.lock_for_update(&mut tx, copy_id).await?;
            if copy.status != CopyStatus::Available {
                tracing::warn!(%user_id, %copy_id, status = ?copy.status, "checkout: copy not available");
                return Err(AppError::CopyNotAvailable(copy_id));
            }
        }

        if let Some(copy_id) = self
            .repository
            .reservations
            .pending_copy_for_user(&mut tx, user_id, &copy_ids)
            .await?
        {
            return Err(AppError::DuplicateRequest(copy_id));
        }

        timeslots::validate(&request.suggested_pickup_timeslots)?;
        timeslots::validate(&request.suggested_return_timeslots)?;

        let reservation = self
            .repository
            .reservations
            .insert(
                &mut tx,
                user_id,
                request.start_date,
                request.end_date,
                &request.suggested_pickup_timeslots,
                &request.suggested_return_timeslots,
            )
            .await?;

        self.repository
            .reservations
            .attach_copies(&mut tx, reservation.id, &copy_ids)
            .await?;

        self.repository
            .copies
            .set_status_many(&mut tx, &copy_ids, CopyStatus::Reserved)
            .await?;

        self.repository.cart.clear_in_tx(&mut tx, user_id).await?;

        tx.commit().await?;

        tracing::info!(
            reservation_id = %reservation.id,
            %user_id,
            copies = copy_ids.len(),
            "reservation created"
        );

        let details = self.details(&reservation).await?;
        self.dispatcher
            .dispatch(ReservationEvent::Created(details.clone()));

        Ok(details)
    }

    /// Admin status update: drives the reservation state machine and the
    /// resulting copy-status side effects in one transaction.
    pub async fn update_status(
        &self,
        id: Uuid,
        request: &UpdateReservationStatusRequest,
    ) -> AppResult<ReservationDetails> {
        let mut tx = self.repository.pool.begin().await?;

        let reservation = self.repository.reservations.lock_for_update(&mut tx, id).await?;
        let next = request.status;

        // Approving fixes the confirmed times; they are required and are
        // never written by any other transition.
        let (pickup_time, return_time) = if next == ReservationStatus::Approved {
            match (request.pickup_time, request.return_time) {
                (Some(pickup), Some(ret)) => (Some(pickup), Some(ret)),
                _ => return Err(AppError::MissingApprovalTimes),
            }
        } else {
            (None, None)
        };

        if !reservation.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: reservation.status,
                to: next,
            });
        }

        self.repository
            .reservations
            .update_status(&mut tx, id, next, pickup_time, return_time)
            .await?;

        let updated = self
            .repository
            .copies
            .set_status_for_reservation(&mut tx, id, next.target_copy_status())
            .await?;

        tx.commit().await?;

        tracing::info!(
            reservation_id = %id,
            from = ?reservation.status,
            to = ?next,
            copies = updated,
            "reservation status updated"
        );

        let reservation = self.repository.reservations.get_by_id(id).await?;
        let details = self.details(&reservation).await?;

        // Creation already notified; pending never triggers mail here.
        if matches!(
            next,
            ReservationStatus::Approved | ReservationStatus::Rejected | ReservationStatus::Returned
        ) {
            self.dispatcher
                .dispatch(ReservationEvent::StatusChanged(details.clone()));
        }

        Ok(details)
    }

    /// Get a single reservation with details
    pub async fn get_reservation(&self, id: Uuid) -> AppResult<ReservationDetails> {
        let reservation = self.repository.reservations.get_by_id(id).await?;
        self.details(&reservation).await
    }

    /// Admin listing with filters and pagination
    pub async fn list_reservations(
        &self,
        filters: &ReservationFilters,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        let (reservations, total) = self.repository.reservations.list(filters).await?;
        let details = self.details_many(&reservations).await?;
        Ok((details, total))
    }

    /// A user's own reservations
    pub async fn list_user_reservations(
        &self,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        self.repository.users.get_by_id(user_id).await?;
        let (reservations, total) = self
            .repository
            .reservations
            .list_by_user(user_id, page, per_page)
            .await?;
        let details = self.details_many(&reservations).await?;
        Ok((details, total))
    }

    /// Assemble the full read-only view of one reservation.
    async fn details(&self, reservation: &Reservation) -> AppResult<ReservationDetails> {
        let mut details = self.details_many(std::slice::from_ref(reservation)).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal("reservation details missing".to_string()))
    }

    /// Batch-assemble details: one query for the copies of all listed
    /// reservations, one user lookup per distinct user.
    async fn details_many(
        &self,
        reservations: &[Reservation],
    ) -> AppResult<Vec<ReservationDetails>> {
        if reservations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = reservations.iter().map(|r| r.id).collect();
        let mut copies_by_reservation: HashMap<Uuid, Vec<_>> = HashMap::new();
        for (reservation_id, copy) in self
            .repository
            .copies
            .details_by_reservation_ids(&ids)
            .await?
        {
            copies_by_reservation
                .entry(reservation_id)
                .or_default()
                .push(copy);
        }

        let mut users: HashMap<Uuid, UserSummary> = HashMap::new();
        for reservation in reservations {
            if !users.contains_key(&reservation.user_id) {
                let user = self.repository.users.get_by_id(reservation.user_id).await?;
                users.insert(reservation.user_id, user.into());
            }
        }

        Ok(reservations
            .iter()
            .map(|r| ReservationDetails {
                id: r.id,
                user: users[&r.user_id].clone(),
                start_date: r.start_date,
                end_date: r.end_date,
                pickup_time: r.pickup_time,
                return_time: r.return_time,
                status: r.status,
                suggested_pickup_timeslots: r.suggested_pickup_timeslots.clone(),
                suggested_return_timeslots: r.suggested_return_timeslots.clone(),
                copies: copies_by_reservation.remove(&r.id).unwrap_or_default(),
                created_at: r.created_at,
            })
            .collect())
    }
}
