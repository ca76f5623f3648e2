use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::interaction::{ClickOutcome, MouseButton, PickOutcome, Toggle};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PickRequest {
    /// Sequence number of the frame the indices were read from.
    pub frame: u64,
    pub indices: Vec<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PickResponse {
    pub frame: u64,
    pub toggles: Vec<Toggle>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClickRequest {
    pub button: MouseButton,
}

#[utoipa::path(
    post,
    path = "/api/pick",
    request_body = PickRequest,
    responses(
        (status = 200, description = "Picked state toggled", body = PickResponse),
        (status = 400, description = "No plot indices given", body = ErrorResponse),
        (status = 409, description = "Frame has been replaced", body = ErrorResponse),
        (status = 429, description = "Pick arrived inside the rate limit window", body = ErrorResponse)
    ),
    tag = "interaction"
)]
pub async fn pick(
    State(state): State<AppState>,
    Json(request): Json<PickRequest>,
) -> ApiResult<Json<PickResponse>> {
    if request.indices.is_empty() {
        return Err(ApiError::Validation("indices must not be empty".to_string()));
    }

    match state.controller.on_pick(request.frame, &request.indices) {
        PickOutcome::Applied { toggles } => Ok(Json(PickResponse {
            frame: request.frame,
            toggles,
        })),
        PickOutcome::RateLimited => Err(ApiError::RateLimited),
        PickOutcome::Stale { current } => Err(ApiError::StaleFrame {
            requested: request.frame,
            current,
        }),
    }
}

#[utoipa::path(
    post,
    path = "/api/click",
    request_body = ClickRequest,
    responses(
        (status = 200, description = "Click handled", body = ClickOutcome),
        (status = 429, description = "Repeated click inside the rate limit window", body = ErrorResponse)
    ),
    tag = "interaction"
)]
pub async fn click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> ApiResult<Json<ClickOutcome>> {
    match state.controller.on_click(request.button) {
        ClickOutcome::RateLimited => Err(ApiError::RateLimited),
        outcome => Ok(Json(outcome)),
    }
}

#[utoipa::path(
    post,
    path = "/api/close",
    responses(
        (status = 202, description = "Shutdown requested")
    ),
    tag = "interaction"
)]
pub async fn close(State(state): State<AppState>) -> StatusCode {
    state.shutdown.trigger("plot window closed");
    StatusCode::ACCEPTED
}
