//! Reservations repository for database operations
//!
//! Reservation rows are never deleted; rejected and returned reservations
//! stay behind as the audit trail.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationFilters, ReservationStatus},
};

/// Default page size for reservation listings.
const DEFAULT_PER_PAGE: i64 = 10;

/// Maximum page size for reservation listings.
const MAX_PER_PAGE: i64 = 100;

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    /// Lock the reservation row for the duration of the ambient
    /// transaction, serializing concurrent status updates.
    pub async fn lock_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    /// Number of copies attached to the user's pending or approved
    /// reservations, i.e. the user's active items.
    pub async fn count_active_copies(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> AppResult<i64> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM reservation_copies rc
            JOIN reservations r ON r.id = rc.reservation_id
            WHERE r.user_id = $1 AND r.status IN ('pending', 'approved')
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?)
    }

    /// First of the given copies (if any) already on one of the user's
    /// pending reservations.
    pub async fn pending_copy_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        copy_ids: &[Uuid],
    ) -> AppResult<Option<Uuid>> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT rc.copy_id
            FROM reservation_copies rc
            JOIN reservations r ON r.id = rc.reservation_id
            WHERE r.user_id = $1 AND r.status = 'pending' AND rc.copy_id = ANY($2)
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(copy_ids)
        .fetch_optional(&mut **tx)
        .await?)
    }

    /// Insert a pending reservation
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        suggested_pickup_timeslots: &[String],
        suggested_return_timeslots: &[String],
    ) -> AppResult<Reservation> {
        Ok(sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations
                (id, user_id, start_date, end_date, status,
                 suggested_pickup_timeslots, suggested_return_timeslots)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(ReservationStatus::Pending)
        .bind(suggested_pickup_timeslots)
        .bind(suggested_return_timeslots)
        .fetch_one(&mut **tx)
        .await?)
    }

    /// Attach the copy set to a reservation. The set is immutable after
    /// creation; no update path exists.
    pub async fn attach_copies(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        copy_ids: &[Uuid],
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reservation_copies (reservation_id, copy_id) \
             SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(reservation_id)
        .bind(copy_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Write a new status; confirmed times are written only when
    /// approving and left untouched otherwise.
    pub async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ReservationStatus,
        pickup_time: Option<DateTime<Utc>>,
        return_time: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET status = $2,
                pickup_time = COALESCE($3, pickup_time),
                return_time = COALESCE($4, return_time),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(pickup_time)
        .bind(return_time)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Admin listing with optional filters, newest first.
    pub async fn list(
        &self,
        filters: &ReservationFilters,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        let per_page = filters
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let page = filters.page.unwrap_or(1).max(1);
        let offset = (page - 1) * per_page;

        let email = filters.email.as_deref();
        let title = filters.book_title.as_deref();

        let where_clause = r#"
            FROM reservations r
            JOIN users u ON u.id = r.user_id
            WHERE ($1::text IS NULL OR u.email ILIKE '%' || $1 || '%')
              AND ($2::varchar IS NULL OR r.status = $2)
              AND ($3::text IS NULL OR EXISTS (
                  SELECT 1
                  FROM reservation_copies rc
                  JOIN book_copies bc ON bc.id = rc.copy_id
                  JOIN books b ON b.id = bc.book_id
                  WHERE rc.reservation_id = r.id
                    AND b.title ILIKE '%' || $3 || '%'
              ))
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {where_clause}"))
            .bind(email)
            .bind(filters.status)
            .bind(title)
            .fetch_one(&self.pool)
            .await?;

        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT r.* {where_clause} ORDER BY r.created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(email)
        .bind(filters.status)
        .bind(title)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((reservations, total))
    }

    /// A user's reservations, newest first.
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let page = page.max(1);
        let offset = (page - 1) * per_page;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((reservations, total))
    }
}
