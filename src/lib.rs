//! Lectern - Small Library Reservation Server
//!
//! A Rust implementation of a lending-library reservation service: users
//! stage physical book copies in a cart and check them out into
//! reservations; an administrator approves, rejects, or closes them. The
//! reservation core guarantees that no copy is ever double-reserved and
//! that the per-user active-item cap holds under concurrent checkouts.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
