use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::booking::{
    Booking, BookingStatus, BookingWithExpert, ExpertSnapshot, NewBooking,
};
use crate::models::expert::{Expert, ExpertFilter, ExpertPage, ExpertWithSlots, NewExpert, Slot};

const EXPERT_COLUMNS: &str =
    "id, name, category, experience, rating, bio, avatar, hourly_rate, created_at, updated_at";

const BOOKING_COLUMNS: &str =
    "id, expert_id, name, email, phone, date, time_slot, notes, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    expert_id: Uuid,
    name: String,
    email: String,
    phone: String,
    date: String,
    time_slot: String,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = Error;

    fn try_from(row: BookingRow) -> Result<Self> {
        let status = row.status.parse::<BookingStatus>().map_err(Error::Internal)?;
        Ok(Self {
            id: row.id,
            expert_id: row.expert_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            date: row.date,
            time_slot: row.time_slot,
            notes: row.notes,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BookingJoinRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    expert_ref_id: Option<Uuid>,
    expert_name: Option<String>,
    expert_category: Option<String>,
    expert_avatar: Option<String>,
}

/// `ILIKE` pattern matching `needle` as a literal substring.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl Store for PgStore {
    async fn count_experts(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM experts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_expert(&self, expert: NewExpert, slots: Vec<Slot>) -> Result<ExpertWithSlots> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Expert>(&format!(
            r#"
            INSERT INTO experts (id, name, category, experience, rating, bio, avatar, hourly_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            EXPERT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&expert.name)
        .bind(&expert.category)
        .bind(expert.experience)
        .bind(expert.rating)
        .bind(&expert.bio)
        .bind(&expert.avatar)
        .bind(expert.hourly_rate)
        .fetch_one(&mut *tx)
        .await?;

        let dates: Vec<String> = slots.iter().map(|s| s.date.clone()).collect();
        let times: Vec<String> = slots.iter().map(|s| s.time.clone()).collect();
        let booked: Vec<bool> = slots.iter().map(|s| s.is_booked).collect();
        sqlx::query(
            r#"
            INSERT INTO slots (expert_id, date, time, is_booked)
            SELECT $1, d, t, b FROM UNNEST($2::text[], $3::text[], $4::bool[]) AS s(d, t, b)
            ON CONFLICT (expert_id, date, time) DO NOTHING
            "#,
        )
        .bind(created.id)
        .bind(&dates)
        .bind(&times)
        .bind(&booked)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let slots = self.list_slots(created.id).await?.unwrap_or_default();
        Ok(ExpertWithSlots {
            expert: created,
            slots,
        })
    }

    async fn list_experts(&self, filter: &ExpertFilter) -> Result<ExpertPage> {
        let search = filter.search.as_deref().map(contains_pattern);
        let where_clause = "WHERE ($1::text IS NULL OR name ILIKE $1) AND ($2::text IS NULL OR category = $2)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM experts {}",
            where_clause
        ))
        .bind(&search)
        .bind(&filter.category)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Expert>(&format!(
            "SELECT {} FROM experts {} ORDER BY rating DESC, name ASC LIMIT $3 OFFSET $4",
            EXPERT_COLUMNS, where_clause
        ))
        .bind(&search)
        .bind(&filter.category)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ExpertPage { items, total })
    }

    async fn get_expert(&self, id: Uuid) -> Result<Option<ExpertWithSlots>> {
        let expert = sqlx::query_as::<_, Expert>(&format!(
            "SELECT {} FROM experts WHERE id = $1",
            EXPERT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match expert {
            Some(expert) => {
                let slots = self.list_slots(id).await?.unwrap_or_default();
                Ok(Some(ExpertWithSlots { expert, slots }))
            }
            None => Ok(None),
        }
    }

    async fn list_slots(&self, expert_id: Uuid) -> Result<Option<Vec<Slot>>> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM experts WHERE id = $1)")
            .bind(expert_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Ok(None);
        }

        let slots = sqlx::query_as::<_, Slot>(
            "SELECT date, time, is_booked FROM slots WHERE expert_id = $1 ORDER BY date, time",
        )
        .bind(expert_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(slots))
    }

    async fn claim_slot(&self, expert_id: Uuid, date: &str, time: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE slots
            SET is_booked = TRUE
            WHERE expert_id = $1 AND date = $2 AND time = $3 AND is_booked = FALSE
            "#,
        )
        .bind(expert_id)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_slot(&self, expert_id: Uuid, date: &str, time: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE slots
            SET is_booked = FALSE
            WHERE expert_id = $1 AND date = $2 AND time = $3 AND is_booked = TRUE
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.expert_id = $1 AND b.date = $2 AND b.time_slot = $3
              )
            "#,
        )
        .bind(expert_id)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (id, expert_id, name, email, phone, date, time_slot, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(booking.expert_id)
        .bind(&booking.name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.date)
        .bind(&booking.time_slot)
        .bind(&booking.notes)
        .bind(BookingStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict("This slot is already booked.".to_string())
            }
            other => Error::from(other),
        })?;
        row.try_into()
    }

    async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<BookingWithExpert>> {
        let rows = sqlx::query_as::<_, BookingJoinRow>(
            r#"
            SELECT b.id, b.expert_id, b.name, b.email, b.phone, b.date, b.time_slot, b.notes,
                   b.status, b.created_at, b.updated_at,
                   e.id AS expert_ref_id, e.name AS expert_name,
                   e.category AS expert_category, e.avatar AS expert_avatar
            FROM bookings b
            LEFT JOIN experts e ON e.id = b.expert_id
            WHERE b.email = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let expert = match (row.expert_ref_id, row.expert_name, row.expert_category) {
                    (Some(id), Some(name), Some(category)) => Some(ExpertSnapshot {
                        id,
                        name,
                        category,
                        avatar: row.expert_avatar,
                    }),
                    _ => None,
                };
                Ok(BookingWithExpert {
                    booking: row.booking.try_into()?,
                    expert,
                })
            })
            .collect()
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
