pub mod booking;
pub mod docs;
pub mod events;
pub mod expert;
pub mod health;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::allowed_origins_cors;
use crate::AppState;

/// The full HTTP surface with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = allowed_origins_cors(&state.allowed_origins);

    let api = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/openapi.json", get(docs::openapi_json))
        .route("/api/experts", get(expert::list_experts))
        .route("/api/experts/:id", get(expert::get_expert))
        .route("/api/experts/:id/slots", get(expert::list_expert_slots))
        .route(
            "/api/bookings",
            get(booking::list_bookings).post(booking::create_booking),
        )
        .route(
            "/api/bookings/:id/status",
            patch(booking::update_booking_status),
        )
        .route("/api/ws", get(events::slot_events));

    api.fallback(route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "message": "Route not found" })),
    )
}
