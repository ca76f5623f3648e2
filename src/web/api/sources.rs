use axum::{extract::State, Json};

use crate::sources::SourceReport;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/sources",
    responses(
        (status = 200, description = "How each TLE source contributed to the catalog", body = Vec<SourceReport>)
    ),
    tag = "sources"
)]
pub async fn list(State(state): State<AppState>) -> Json<Vec<SourceReport>> {
    Json(state.reports.as_ref().clone())
}
