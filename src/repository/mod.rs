//! Repository layer for database operations

pub mod books;
pub mod cart;
pub mod copies;
pub mod reservations;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
///
/// The pool is injected here and cloned into each sub-repository; nothing
/// in the crate reaches for a process-global handle.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub cart: cart::CartRepository,
    pub copies: copies::CopiesRepository,
    pub reservations: reservations::ReservationsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            cart: cart::CartRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
