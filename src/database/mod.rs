pub mod memory_store;
pub mod pg_store;
pub mod pool;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::booking::{Booking, BookingStatus, BookingWithExpert, NewBooking};
use crate::models::expert::{ExpertFilter, ExpertPage, ExpertWithSlots, NewExpert, Slot};

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;

/// Durable home of experts, their slots and bookings.
///
/// `claim_slot` is the only operation that flips a slot to booked and must
/// test-and-set in one indivisible step: when several callers claim the same
/// `(expert_id, date, time)` concurrently, exactly one of them gets `true`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn count_experts(&self) -> Result<i64>;

    async fn insert_expert(&self, expert: NewExpert, slots: Vec<Slot>) -> Result<ExpertWithSlots>;

    /// Experts matching `filter`, highest rating first, plus the unpaged total.
    async fn list_experts(&self, filter: &ExpertFilter) -> Result<ExpertPage>;

    async fn get_expert(&self, id: Uuid) -> Result<Option<ExpertWithSlots>>;

    /// Slots ordered by date then time, `None` when the expert does not exist.
    async fn list_slots(&self, expert_id: Uuid) -> Result<Option<Vec<Slot>>>;

    /// Marks the slot booked if it exists and is free. Returns whether this
    /// call performed the transition.
    async fn claim_slot(&self, expert_id: Uuid, date: &str, time: &str) -> Result<bool>;

    /// Compensation for a claim whose booking could not be written. A slot
    /// that already has a booking record is left untouched.
    async fn release_slot(&self, expert_id: Uuid, date: &str, time: &str) -> Result<bool>;

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking>;

    /// Newest first, with the expert's current name, category and avatar.
    async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<BookingWithExpert>>;

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>>;

    /// Releases connections. The handle must not be used afterwards.
    async fn close(&self);
}

/// Opens PostgreSQL when `DATABASE_URL` is configured and reachable, otherwise
/// falls back to the embedded in-memory store.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    match &config.database_url {
        Some(url) => match pool::create_pool(url, config.store_timeout).await {
            Ok(pool) => {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
                info!("Connected to PostgreSQL");
                return Ok(Arc::new(PgStore::new(pool)));
            }
            Err(e) => {
                warn!(error = %e, "PostgreSQL unavailable, starting the embedded store");
            }
        },
        None => info!("DATABASE_URL not set, starting the embedded store"),
    }
    Ok(Arc::new(MemoryStore::new()))
}

/// Bounds a store call. Expiry surfaces as a retryable [`Error::Transient`].
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Transient(format!(
            "store call exceeded {} ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_store_calls_become_transient() {
        let result: Result<()> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        let err = result.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn missing_database_url_falls_back_to_embedded_store() {
        let store = connect(&Config::default()).await.unwrap();
        assert_eq!(store.count_experts().await.unwrap(), 0);
    }
}
