use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::observer::ObserverState;
use crate::sky::{lock, FrameEntry, PlotArrays, TrackedBody};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FrameResponse {
    /// Quote this in pick requests.
    pub seq: u64,
    pub instant: Option<DateTime<Utc>>,
    pub observer: ObserverState,
    pub entries: Vec<FrameEntry>,
    pub plot: PlotArrays,
}

#[utoipa::path(
    get,
    path = "/api/frame",
    responses(
        (status = 200, description = "Most recently published frame", body = FrameResponse)
    ),
    tag = "sky"
)]
pub async fn frame(State(state): State<AppState>) -> Json<FrameResponse> {
    let sky = lock(&state.sky);
    Json(FrameResponse {
        seq: sky.frame.seq,
        instant: sky.frame.instant,
        observer: state.observer.as_ref().clone(),
        entries: sky.frame.entries.clone(),
        plot: sky.frame.plot_arrays(),
    })
}

#[utoipa::path(
    get,
    path = "/api/tracked",
    responses(
        (status = 200, description = "Tracked bodies in pick order", body = Vec<TrackedBody>)
    ),
    tag = "sky"
)]
pub async fn tracked(State(state): State<AppState>) -> Json<Vec<TrackedBody>> {
    Json(lock(&state.sky).tracked_bodies())
}
