use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Directory entry without its slots.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expert {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub experience: i32,
    pub rating: f64,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bookable calendar position owned by one expert.
///
/// `(date, time)` is unique per expert and `is_booked` only ever moves from
/// `false` to `true`, except for the compensating release after a failed
/// booking insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Slot {
    pub date: String,
    pub time: String,
    pub is_booked: bool,
}

impl Slot {
    pub fn open(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            is_booked: false,
        }
    }

    pub fn matches(&self, date: &str, time: &str) -> bool {
        self.date == date && self.time == time
    }
}

#[derive(Debug, Clone)]
pub struct ExpertWithSlots {
    pub expert: Expert,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone)]
pub struct NewExpert {
    pub name: String,
    pub category: String,
    pub experience: i32,
    pub rating: f64,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub hourly_rate: Option<Decimal>,
}

/// Sentinel category meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Default)]
pub struct ExpertFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl ExpertFilter {
    pub fn matches(&self, expert: &Expert) -> bool {
        let name_ok = self
            .search
            .as_deref()
            .map(|needle| expert.name.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(true);
        let category_ok = self
            .category
            .as_deref()
            .map(|category| expert.category == category)
            .unwrap_or(true);
        name_ok && category_ok
    }
}

pub struct ExpertPage {
    pub items: Vec<Expert>,
    pub total: i64,
}
