//! Slot reservation.
//!
//! A reservation claims the slot with the store's atomic conditional update
//! and only then writes the booking record. Concurrent reservations of one
//! slot are serialized by that claim alone: exactly one caller observes a
//! successful claim and every other caller gets [`Error::Conflict`].
//!
//! If the booking insert fails after a successful claim, the claim is
//! released again. When that compensation also fails, the slot stays booked
//! without a booking record and the call returns [`Error::OrphanedClaim`],
//! which is logged for manual reconciliation. A claim that times out has an
//! unknown outcome; it is logged the same way and surfaces as a retryable
//! [`Error::Transient`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::database::{with_timeout, Store};
use crate::dto::booking_dto::CreateBookingPayload;
use crate::error::{Error, Result};
use crate::models::booking::{Booking, NewBooking};
use crate::services::notification_service::{Notifier, SlotUpdate};
use crate::utils::validation::parse_uuid_field;

pub const SLOT_UNAVAILABLE: &str =
    "This slot is already booked or does not exist. Please choose another.";

#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl ReservationService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            store,
            notifier,
            timeout,
        }
    }

    pub async fn reserve(&self, payload: CreateBookingPayload) -> Result<Booking> {
        let payload = payload.trimmed();
        payload.validate()?;
        let expert_id = parse_uuid_field("expert_id", &payload.expert_id)?;

        let booking = NewBooking {
            expert_id,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            date: payload.date,
            time_slot: payload.time_slot,
            notes: payload.notes,
        };
        let date = booking.date.clone();
        let time = booking.time_slot.clone();

        let claimed = match with_timeout(
            self.timeout,
            self.store.claim_slot(expert_id, &date, &time),
        )
        .await
        {
            Ok(claimed) => claimed,
            Err(err) if err.is_retryable() => {
                // The store may still apply the claim after the deadline.
                // Releasing here could unbook a concurrent caller's claim,
                // so the slot is only reported.
                error!(
                    %expert_id,
                    %date,
                    %time,
                    error = %err,
                    "Slot claim outcome unknown, slot may be booked without a booking record"
                );
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        if !claimed {
            debug!(%expert_id, %date, %time, "Slot claim rejected");
            return Err(Error::Conflict(SLOT_UNAVAILABLE.to_string()));
        }

        let created = match with_timeout(self.timeout, self.store.insert_booking(booking)).await {
            Ok(created) => created,
            Err(err) => return Err(self.compensate(expert_id, &date, &time, err).await),
        };

        let receivers = self.notifier.publish(SlotUpdate {
            expert_id,
            date: date.clone(),
            time: time.clone(),
            is_booked: true,
        });
        info!(
            booking_id = %created.id,
            %expert_id,
            %date,
            %time,
            receivers,
            "Slot reserved"
        );

        Ok(created)
    }

    /// Undoes a claim whose booking insert failed and returns the error the
    /// caller should see.
    async fn compensate(&self, expert_id: Uuid, date: &str, time: &str, cause: Error) -> Error {
        // A unique violation means a booking for this slot already exists, so
        // the slot is legitimately booked.
        if matches!(cause, Error::Conflict(_)) {
            return cause;
        }

        warn!(error = %cause, %expert_id, %date, %time, "Booking insert failed, releasing claim");
        match with_timeout(self.timeout, self.store.release_slot(expert_id, date, time)).await {
            Ok(_) => cause,
            Err(release_err) => {
                error!(
                    %expert_id,
                    %date,
                    %time,
                    insert_error = %cause,
                    release_error = %release_err,
                    "Orphaned slot claim requires manual reconciliation"
                );
                Error::OrphanedClaim {
                    expert_id,
                    date: date.to_string(),
                    time: time.to_string(),
                }
            }
        }
    }
}
