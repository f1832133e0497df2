//! Business logic services

pub mod cart;
pub mod catalog;
pub mod email;
pub mod notifications;
pub mod reservations;
pub mod timeslots;

use std::sync::Arc;

use crate::{
    config::{EmailConfig, NotificationsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub cart: cart::CartService,
    pub catalog: catalog::CatalogService,
    pub reservations: reservations::ReservationsService,
    pub email: email::EmailService,
    pub notifications: notifications::NotificationDispatcher,
    /// Kept for readiness probes; business logic goes through the
    /// services above.
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository.
    ///
    /// Spawns the notification worker; must be called from within a tokio
    /// runtime.
    pub fn new(
        repository: Repository,
        email_config: EmailConfig,
        notifications_config: NotificationsConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config);
        let notifications = notifications::NotificationDispatcher::spawn(
            Arc::new(email.clone()),
            notifications_config.queue_capacity,
        );

        Self {
            cart: cart::CartService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(
                repository.clone(),
                notifications.clone(),
            ),
            email,
            notifications,
            repository,
        }
    }
}
