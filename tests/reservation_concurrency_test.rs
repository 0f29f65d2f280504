mod common;

use axum::http::StatusCode;
use common::{expert_with_morning_slot, json_request, send, test_app, test_state};
use expert_booking::{dto::booking_dto::CreateBookingPayload, error::Error};
use serde_json::json;
use uuid::Uuid;

const CONTENDERS: usize = 32;

fn payload(expert_id: Uuid, n: usize) -> CreateBookingPayload {
    CreateBookingPayload {
        expert_id: expert_id.to_string(),
        name: format!("Client {}", n),
        email: "race@example.com".to_string(),
        phone: "555-000-1111".to_string(),
        date: "2025-06-01".to_string(),
        time_slot: "09:00".to_string(),
        notes: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_yield_exactly_one_booking() {
    let state = test_state();
    let expert_id = expert_with_morning_slot(&state).await.expert.id;

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|n| {
            let reservations = state.reservation_service.clone();
            tokio::spawn(async move { reservations.reserve(payload(expert_id, n)).await })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task completed") {
            Ok(_) => successes += 1,
            Err(Error::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(conflicts, CONTENDERS - 1);

    let bookings = state
        .booking_service
        .find_by_email(Some("race@example.com"))
        .await
        .unwrap();
    assert_eq!(bookings.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_http_reservations_get_one_created_rest_conflict() {
    let (app, state) = test_app();
    let expert_id = expert_with_morning_slot(&state).await.expert.id;

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|n| {
            let app = app.clone();
            let body = json!({
                "expertId": expert_id,
                "name": format!("Client {}", n),
                "email": format!("client{}@example.com", n),
                "phone": "555-000-1111",
                "date": "2025-06-01",
                "timeSlot": "10:00",
            });
            tokio::spawn(async move { send(&app, json_request("POST", "/api/bookings", body)).await.0 })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(),
        CONTENDERS - 1
    );
}

#[tokio::test]
async fn claimed_slot_stays_booked_on_every_read() {
    let state = test_state();
    let expert_id = expert_with_morning_slot(&state).await.expert.id;
    state
        .reservation_service
        .reserve(payload(expert_id, 0))
        .await
        .unwrap();

    for _ in 0..5 {
        let slots = state
            .expert_service
            .list_slots(&expert_id.to_string())
            .await
            .unwrap();
        let slot = slots
            .iter()
            .find(|s| s.matches("2025-06-01", "09:00"))
            .unwrap();
        assert!(slot.is_booked);
    }

    let expert = state.expert_service.get(&expert_id.to_string()).await.unwrap();
    assert!(expert.slots.iter().any(|s| s.matches("2025-06-01", "09:00") && s.is_booked));
}
