use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::database::{with_timeout, Store};
use crate::error::{Error, Result};
use crate::models::booking::{Booking, BookingStatus, BookingWithExpert};

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl BookingService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Bookings made with `email`, most recent first. Expert fields reflect
    /// the expert as it is now, not as it was when booked.
    pub async fn find_by_email(&self, email: Option<&str>) -> Result<Vec<BookingWithExpert>> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::BadRequest("Email is required.".to_string()))?;
        with_timeout(self.timeout, self.store.find_bookings_by_email(email)).await
    }

    /// Any status may follow any other.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Booking> {
        let status = status.parse::<BookingStatus>().map_err(Error::BadRequest)?;
        let not_found = || Error::NotFound("Booking not found.".to_string());
        let id = Uuid::parse_str(id).map_err(|_| not_found())?;

        with_timeout(self.timeout, self.store.update_booking_status(id, status))
            .await?
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockStore;

    fn service(store: MockStore) -> BookingService {
        BookingService::new(Arc::new(store), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn blank_email_is_rejected_before_querying() {
        let svc = service(MockStore::new());
        assert!(matches!(svc.find_by_email(None).await, Err(Error::BadRequest(_))));
        assert!(matches!(svc.find_by_email(Some("  ")).await, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn invalid_status_wins_over_unknown_id() {
        let svc = service(MockStore::new());
        let err = svc.update_status("nope", "Cancelled").await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let mut store = MockStore::new();
        store
            .expect_update_booking_status()
            .times(1)
            .returning(|_, _| Ok(None));
        let err = service(store)
            .update_status(&Uuid::new_v4().to_string(), "Completed")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
