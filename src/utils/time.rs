use chrono::{DateTime, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current calendar date in UTC, the reference day for slot provisioning.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
