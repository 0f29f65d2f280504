use chrono::{Days, NaiveDate};

use crate::models::expert::Slot;

/// Number of upcoming days an expert is bookable for when provisioned.
pub const DEFAULT_DAYS: u64 = 7;

pub const DEFAULT_TIMES: [&str; 8] = [
    "09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00", "17:00",
];

/// One open slot for every time in `times` on each of the `days` calendar
/// days following `from`.
pub fn generate_slots(from: NaiveDate, days: u64, times: &[&str]) -> Vec<Slot> {
    (1..=days)
        .filter_map(|offset| from.checked_add_days(Days::new(offset)))
        .flat_map(|day| {
            let date = day.format("%Y-%m-%d").to_string();
            times.iter().map(move |time| Slot::open(date.clone(), *time))
        })
        .collect()
}

pub fn default_slots(from: NaiveDate) -> Vec<Slot> {
    generate_slots(from, DEFAULT_DAYS, &DEFAULT_TIMES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_the_day_after_and_crosses_month_end() {
        let from = NaiveDate::from_ymd_opt(2025, 5, 30).unwrap();
        let slots = generate_slots(from, 3, &["09:00", "14:00"]);

        let positions: Vec<(&str, &str)> = slots
            .iter()
            .map(|s| (s.date.as_str(), s.time.as_str()))
            .collect();
        assert_eq!(
            positions,
            vec![
                ("2025-05-31", "09:00"),
                ("2025-05-31", "14:00"),
                ("2025-06-01", "09:00"),
                ("2025-06-01", "14:00"),
                ("2025-06-02", "09:00"),
                ("2025-06-02", "14:00"),
            ]
        );
        assert!(slots.iter().all(|s| !s.is_booked));
    }

    #[test]
    fn default_schedule_is_a_week_of_eight_slots() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(default_slots(from).len(), 56);
    }
}
