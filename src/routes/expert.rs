use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::expert_dto::{ExpertListQuery, ExpertListResponse, ExpertResponse, SlotResponse},
    error::Result,
    extractors::ApiQuery,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/experts",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("category" = Option<String>, Query, description = "Exact category, or All"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Experts by rating, highest first", body = ExpertListResponse),
        (status = 503, description = "Store unavailable")
    )
)]
#[axum::debug_handler]
pub async fn list_experts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpertListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.expert_service.list(query).await?;
    Ok(Json(ExpertListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/experts/{id}",
    params(
        ("id" = String, Path, description = "Expert ID")
    ),
    responses(
        (status = 200, description = "Expert with slots", body = ExpertResponse),
        (status = 404, description = "Expert not found")
    )
)]
#[axum::debug_handler]
pub async fn get_expert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let expert = state.expert_service.get(&id).await?;
    Ok(Json(ExpertResponse::from(expert)))
}

#[utoipa::path(
    get,
    path = "/api/experts/{id}/slots",
    params(
        ("id" = String, Path, description = "Expert ID")
    ),
    responses(
        (status = 200, description = "Slots ordered by date and time", body = [SlotResponse]),
        (status = 404, description = "Expert not found")
    )
)]
#[axum::debug_handler]
pub async fn list_expert_slots(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let slots = state.expert_service.list_slots(&id).await?;
    Ok(Json(
        slots.into_iter().map(SlotResponse::from).collect::<Vec<_>>(),
    ))
}
