use axum::Json;
use utoipa::OpenApi;

use crate::dto::booking_dto::{
    BookedExpert, BookingResponse, CreateBookingPayload, UpdateBookingStatusPayload,
};
use crate::dto::expert_dto::{ExpertListResponse, ExpertResponse, ExpertSummary, SlotResponse};
use crate::models::booking::BookingStatus;
use crate::services::notification_service::SlotUpdate;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::expert::list_experts,
        crate::routes::expert::get_expert,
        crate::routes::expert::list_expert_slots,
        crate::routes::booking::create_booking,
        crate::routes::booking::list_bookings,
        crate::routes::booking::update_booking_status,
    ),
    components(schemas(
        ExpertSummary,
        ExpertResponse,
        ExpertListResponse,
        SlotResponse,
        CreateBookingPayload,
        UpdateBookingStatusPayload,
        BookingResponse,
        BookedExpert,
        BookingStatus,
        SlotUpdate,
    )),
    tags((name = "expert-booking", description = "Expert directory and slot reservations"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
