//! Asynchronous notification dispatch
//!
//! Reservation lifecycle operations enqueue events here after their
//! transaction commits and return immediately. A single worker task
//! drains the bounded queue and makes exactly one delivery attempt per
//! event; a failed or dropped notification never changes the outcome of
//! the operation that produced it.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{error::AppResult, models::reservation::ReservationDetails};

/// A committed lifecycle event worth telling the user about.
#[derive(Debug, Clone)]
pub enum ReservationEvent {
    /// Checkout committed; the reservation is pending review.
    Created(ReservationDetails),
    /// An admin moved the reservation to approved, rejected, or returned.
    StatusChanged(ReservationDetails),
}

impl ReservationEvent {
    fn reservation_id(&self) -> uuid::Uuid {
        match self {
            ReservationEvent::Created(details) => details.id,
            ReservationEvent::StatusChanged(details) => details.id,
        }
    }
}

/// Delivery sink for reservation events.
///
/// The snapshot handed in is read-only; implementations cannot reach back
/// into lifecycle state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationNotifier: Send + Sync {
    async fn reservation_received(&self, details: &ReservationDetails) -> AppResult<()>;
    async fn reservation_status_changed(&self, details: &ReservationDetails) -> AppResult<()>;
}

/// Handle used by services to enqueue events.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<ReservationEvent>,
}

impl NotificationDispatcher {
    /// Spawn the worker task and return the dispatch handle.
    pub fn spawn(notifier: Arc<dyn ReservationNotifier>, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity);
        tokio::spawn(run_worker(rx, notifier));
        Self { tx }
    }

    /// Enqueue an event without waiting.
    ///
    /// When the queue is full the event is dropped and logged; the caller
    /// is never blocked and never sees an error.
    pub fn dispatch(&self, event: ReservationEvent) {
        let reservation_id = event.reservation_id();
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(%reservation_id, error = %e, "notification queue full, event dropped");
        }
    }
}

/// Drain the queue until every sender is gone.
async fn run_worker(
    mut rx: mpsc::Receiver<ReservationEvent>,
    notifier: Arc<dyn ReservationNotifier>,
) {
    tracing::info!("notification worker started");

    while let Some(event) = rx.recv().await {
        let reservation_id = event.reservation_id();
        let result = match &event {
            ReservationEvent::Created(details) => notifier.reservation_received(details).await,
            ReservationEvent::StatusChanged(details) => {
                notifier.reservation_status_changed(details).await
            }
        };

        // One attempt only; the reservation itself is already committed.
        if let Err(e) = result {
            tracing::warn!(%reservation_id, error = %e, "notification delivery failed");
        }
    }

    tracing::info!("notification worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::reservation::ReservationStatus;
    use crate::models::user::UserSummary;
    use chrono::Utc;
    use uuid::Uuid;

    fn details() -> ReservationDetails {
        ReservationDetails {
            id: Uuid::new_v4(),
            user: UserSummary {
                id: Uuid::new_v4(),
                email: "reader@example.org".to_string(),
                name: "Reader".to_string(),
            },
            start_date: Utc::now(),
            end_date: Utc::now(),
            pickup_time: None,
            return_time: None,
            status: ReservationStatus::Pending,
            suggested_pickup_timeslots: vec!["2024-01-01T09:00:00Z".to_string()],
            suggested_return_timeslots: vec!["2024-01-08T17:30:00Z".to_string()],
            copies: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn created_event_is_delivered_once() {
        let mut mock = MockReservationNotifier::new();
        mock.expect_reservation_received()
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_reservation_status_changed().times(0);

        let dispatcher = NotificationDispatcher::spawn(Arc::new(mock), 8);
        dispatcher.dispatch(ReservationEvent::Created(details()));

        // Drop the handle so the worker drains and exits, then let it run.
        drop(dispatcher);
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let mut mock = MockReservationNotifier::new();
        mock.expect_reservation_status_changed()
            .times(1)
            .returning(|_| Err(AppError::Internal("smtp down".to_string())));

        let dispatcher = NotificationDispatcher::spawn(Arc::new(mock), 8);
        // dispatch never errors, even when delivery will fail
        dispatcher.dispatch(ReservationEvent::StatusChanged(details()));

        drop(dispatcher);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        // No worker consumes because the mock never resolves the first
        // event until we let the runtime breathe; capacity 1 forces the
        // second dispatch onto a full queue. Either way dispatch returns
        // immediately.
        let mut mock = MockReservationNotifier::new();
        mock.expect_reservation_received().returning(|_| Ok(()));

        let dispatcher = NotificationDispatcher::spawn(Arc::new(mock), 1);
        dispatcher.dispatch(ReservationEvent::Created(details()));
        dispatcher.dispatch(ReservationEvent::Created(details()));
        dispatcher.dispatch(ReservationEvent::Created(details()));
    }
}
