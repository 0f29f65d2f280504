#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use expert_booking::{
    config::Config,
    database::MemoryStore,
    models::expert::{ExpertWithSlots, NewExpert, Slot},
    routes, AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const CLIENT_ORIGIN: &str = "http://localhost:5173";

pub fn test_config() -> Config {
    Config {
        allowed_origins: vec![CLIENT_ORIGIN.to_string()],
        ..Config::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), &test_config())
}

pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    (routes::router(state.clone()), state)
}

pub fn new_expert(name: &str, category: &str, rating: f64) -> NewExpert {
    NewExpert {
        name: name.to_string(),
        category: category.to_string(),
        experience: 8,
        rating,
        bio: Some(format!("{} bio", name)),
        avatar: Some(format!("https://avatars.example.com/{}", name.replace(' ', "-"))),
        hourly_rate: None,
    }
}

/// Expert E of the reservation scenario: one free slot on 2025-06-01 at 09:00.
pub async fn expert_with_morning_slot(state: &AppState) -> ExpertWithSlots {
    state
        .store
        .insert_expert(
            new_expert("Marcus Chen", "Finance", 4.7),
            vec![
                Slot::open("2025-06-01", "09:00"),
                Slot::open("2025-06-01", "10:00"),
            ],
        )
        .await
        .expect("insert expert")
}

pub fn json_request(method: &str, uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
