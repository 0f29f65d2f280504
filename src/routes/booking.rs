use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::booking_dto::{
        BookingListQuery, BookingResponse, CreateBookingPayload, UpdateBookingStatusPayload,
    },
    error::Result,
    extractors::{ApiJson, ApiQuery},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Slot reserved", body = BookingResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Slot already booked or does not exist"),
        (status = 503, description = "Store unavailable, safe to retry")
    )
)]
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBookingPayload>,
) -> Result<impl IntoResponse> {
    let payload = payload.trimmed();
    payload.validate()?;
    let booking = state.reservation_service.reserve(payload).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("email" = String, Query, description = "Requester email")
    ),
    responses(
        (status = 200, description = "Bookings, most recent first", body = [BookingResponse]),
        (status = 400, description = "Email missing")
    )
)]
#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookingListQuery>,
) -> Result<impl IntoResponse> {
    let bookings = state
        .booking_service
        .find_by_email(query.email.as_deref())
        .await?;
    Ok(Json(
        bookings
            .into_iter()
            .map(BookingResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    request_body = UpdateBookingStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = BookingResponse),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Booking not found")
    )
)]
#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateBookingStatusPayload>,
) -> Result<impl IntoResponse> {
    let booking = state
        .booking_service
        .update_status(&id, &payload.status)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}
