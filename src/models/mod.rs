//! Data models for Lectern

pub mod book;
pub mod cart;
pub mod copy;
pub mod reservation;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookSummary};
pub use cart::CartEntry;
pub use copy::{BookCopy, CopyCondition, CopyStatus};
pub use reservation::{Reservation, ReservationDetails, ReservationStatus};
pub use user::{User, UserClaims, UserRole, UserSummary};
