use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::booking::{
    Booking, BookingStatus, BookingWithExpert, ExpertSnapshot, NewBooking,
};
use crate::models::expert::{Expert, ExpertFilter, ExpertPage, ExpertWithSlots, NewExpert, Slot};
use crate::utils::time::now;

#[derive(Default)]
struct Inner {
    experts: HashMap<Uuid, ExpertWithSlots>,
    bookings: Vec<Booking>,
}

impl Inner {
    fn has_booking_for(&self, expert_id: Uuid, date: &str, time: &str) -> bool {
        self.bookings
            .iter()
            .any(|b| b.expert_id == expert_id && b.date == date && b.time_slot == time)
    }
}

/// Embedded store used when no PostgreSQL is reachable and in tests.
///
/// Every operation runs under one mutex and never awaits while holding it,
/// so `claim_slot` tests and sets within a single critical section.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("memory store mutex poisoned".to_string()))
    }
}

fn by_rating_desc(a: &Expert, b: &Expert) -> Ordering {
    b.rating
        .partial_cmp(&a.rating)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

#[async_trait]
impl Store for MemoryStore {
    async fn count_experts(&self) -> Result<i64> {
        Ok(self.lock()?.experts.len() as i64)
    }

    async fn insert_expert(&self, expert: NewExpert, slots: Vec<Slot>) -> Result<ExpertWithSlots> {
        let mut slots = slots;
        slots.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
        slots.dedup_by(|a, b| a.matches(&b.date, &b.time));

        let timestamp = now();
        let created = ExpertWithSlots {
            expert: Expert {
                id: Uuid::new_v4(),
                name: expert.name,
                category: expert.category,
                experience: expert.experience,
                rating: expert.rating,
                bio: expert.bio,
                avatar: expert.avatar,
                hourly_rate: expert.hourly_rate,
                created_at: timestamp,
                updated_at: timestamp,
            },
            slots,
        };
        self.lock()?
            .experts
            .insert(created.expert.id, created.clone());
        Ok(created)
    }

    async fn list_experts(&self, filter: &ExpertFilter) -> Result<ExpertPage> {
        let inner = self.lock()?;
        let mut matching: Vec<Expert> = inner
            .experts
            .values()
            .map(|e| &e.expert)
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(by_rating_desc);

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok(ExpertPage { items, total })
    }

    async fn get_expert(&self, id: Uuid) -> Result<Option<ExpertWithSlots>> {
        Ok(self.lock()?.experts.get(&id).cloned())
    }

    async fn list_slots(&self, expert_id: Uuid) -> Result<Option<Vec<Slot>>> {
        Ok(self
            .lock()?
            .experts
            .get(&expert_id)
            .map(|e| e.slots.clone()))
    }

    async fn claim_slot(&self, expert_id: Uuid, date: &str, time: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let Some(entry) = inner.experts.get_mut(&expert_id) else {
            return Ok(false);
        };
        match entry
            .slots
            .iter_mut()
            .find(|s| s.matches(date, time) && !s.is_booked)
        {
            Some(slot) => {
                slot.is_booked = true;
                entry.expert.updated_at = now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release_slot(&self, expert_id: Uuid, date: &str, time: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        if inner.has_booking_for(expert_id, date, time) {
            return Ok(false);
        }
        let Some(entry) = inner.experts.get_mut(&expert_id) else {
            return Ok(false);
        };
        match entry
            .slots
            .iter_mut()
            .find(|s| s.matches(date, time) && s.is_booked)
        {
            Some(slot) => {
                slot.is_booked = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking> {
        let mut inner = self.lock()?;
        if !inner.experts.contains_key(&booking.expert_id) {
            return Err(Error::NotFound("Expert not found".to_string()));
        }
        if inner.has_booking_for(booking.expert_id, &booking.date, &booking.time_slot) {
            return Err(Error::Conflict("This slot is already booked.".to_string()));
        }

        let timestamp = now();
        let created = Booking {
            id: Uuid::new_v4(),
            expert_id: booking.expert_id,
            name: booking.name,
            email: booking.email,
            phone: booking.phone,
            date: booking.date,
            time_slot: booking.time_slot,
            notes: booking.notes,
            status: BookingStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        };
        inner.bookings.push(created.clone());
        Ok(created)
    }

    async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<BookingWithExpert>> {
        let inner = self.lock()?;
        // Insertion order breaks ties between equal timestamps.
        let mut found: Vec<BookingWithExpert> = inner
            .bookings
            .iter()
            .rev()
            .filter(|b| b.email == email)
            .map(|b| BookingWithExpert {
                booking: b.clone(),
                expert: inner.experts.get(&b.expert_id).map(|e| ExpertSnapshot {
                    id: e.expert.id,
                    name: e.expert.name.clone(),
                    category: e.expert.category.clone(),
                    avatar: e.expert.avatar.clone(),
                }),
            })
            .collect();
        found.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(found)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>> {
        let mut inner = self.lock()?;
        Ok(inner.bookings.iter_mut().find(|b| b.id == id).map(|b| {
            b.status = status;
            b.updated_at = now();
            b.clone()
        }))
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_expert(name: &str, rating: f64) -> NewExpert {
        NewExpert {
            name: name.to_string(),
            category: "Finance".to_string(),
            experience: 5,
            rating,
            bio: None,
            avatar: None,
            hourly_rate: None,
        }
    }

    #[tokio::test]
    async fn claim_succeeds_once_per_slot() {
        let store = MemoryStore::new();
        let expert = store
            .insert_expert(new_expert("Marcus Chen", 4.7), vec![Slot::open("2025-06-01", "09:00")])
            .await
            .unwrap();
        let id = expert.expert.id;

        assert!(store.claim_slot(id, "2025-06-01", "09:00").await.unwrap());
        assert!(!store.claim_slot(id, "2025-06-01", "09:00").await.unwrap());
        assert!(!store.claim_slot(id, "2025-06-01", "10:00").await.unwrap());
        assert!(!store.claim_slot(Uuid::new_v4(), "2025-06-01", "09:00").await.unwrap());
    }

    #[tokio::test]
    async fn release_keeps_slots_that_have_a_booking() {
        let store = MemoryStore::new();
        let expert = store
            .insert_expert(new_expert("Lisa Thompson", 4.8), vec![Slot::open("2025-06-01", "09:00")])
            .await
            .unwrap();
        let id = expert.expert.id;
        assert!(store.claim_slot(id, "2025-06-01", "09:00").await.unwrap());
        store
            .insert_booking(NewBooking {
                expert_id: id,
                name: "Ann".into(),
                email: "ann@example.com".into(),
                phone: "5551234567".into(),
                date: "2025-06-01".into(),
                time_slot: "09:00".into(),
                notes: None,
            })
            .await
            .unwrap();

        assert!(!store.release_slot(id, "2025-06-01", "09:00").await.unwrap());
        let slots = store.list_slots(id).await.unwrap().unwrap();
        assert!(slots[0].is_booked);
    }

    #[tokio::test]
    async fn slots_are_kept_in_calendar_order() {
        let store = MemoryStore::new();
        let expert = store
            .insert_expert(
                new_expert("Dev Kumar", 4.7),
                vec![
                    Slot::open("2025-06-02", "09:00"),
                    Slot::open("2025-06-01", "14:00"),
                    Slot::open("2025-06-01", "09:00"),
                    Slot::open("2025-06-01", "09:00"),
                ],
            )
            .await
            .unwrap();
        let times: Vec<(String, String)> = expert
            .slots
            .into_iter()
            .map(|s| (s.date, s.time))
            .collect();
        assert_eq!(
            times,
            vec![
                ("2025-06-01".to_string(), "09:00".to_string()),
                ("2025-06-01".to_string(), "14:00".to_string()),
                ("2025-06-02".to_string(), "09:00".to_string()),
            ]
        );
    }
}
