use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Completed" => Ok(BookingStatus::Completed),
            other => Err(format!(
                "Invalid status value '{}', expected one of Pending, Confirmed, Completed",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub expert_id: Uuid,
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

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub expert_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time_slot: String,
    pub notes: Option<String>,
}

/// Current values of the booked expert, joined at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertSnapshot {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingWithExpert {
    pub booking: Booking,
    pub expert: Option<ExpertSnapshot>,
}
