use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::{Booking, BookingStatus, BookingWithExpert, ExpertSnapshot};
use crate::utils::validation::{not_blank, DATE_RE, PHONE_RE, TIME_RE};

/// Reservation request. Absent fields deserialize as empty strings so they
/// are reported by validation instead of by the JSON extractor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBookingPayload {
    #[validate(length(min = 1, message = "expertId is required"))]
    pub expert_id: String,
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: String,
    #[validate(regex(path = *DATE_RE, message = "Date must be formatted as YYYY-MM-DD"))]
    pub date: String,
    #[validate(regex(path = *TIME_RE, message = "Time slot must be formatted as HH:MM"))]
    pub time_slot: String,
    pub notes: Option<String>,
}

impl CreateBookingPayload {
    /// Strips surrounding whitespace from every field and drops blank notes.
    /// Validation runs on the result, so what is checked is what gets stored.
    pub fn trimmed(self) -> Self {
        Self {
            expert_id: self.expert_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date: self.date.trim().to_string(),
            time_slot: self.time_slot.trim().to_string(),
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BookingListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct UpdateBookingStatusPayload {
    /// One of `Pending`, `Confirmed`, `Completed`.
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookedExpert {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub expert_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expert: Option<BookedExpert>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time_slot: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpertSnapshot> for BookedExpert {
    fn from(value: ExpertSnapshot) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            avatar: value.avatar,
        }
    }
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        Self {
            id: value.id,
            expert_id: value.expert_id,
            expert: None,
            name: value.name,
            email: value.email,
            phone: value.phone,
            date: value.date,
            time_slot: value.time_slot,
            notes: value.notes,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<BookingWithExpert> for BookingResponse {
    fn from(value: BookingWithExpert) -> Self {
        let mut response = BookingResponse::from(value.booking);
        response.expert = value.expert.map(Into::into);
        response
    }
}
