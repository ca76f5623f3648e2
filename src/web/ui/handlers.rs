use axum::{extract::State, response::IntoResponse};

use crate::web::state::AppState;

use super::templates::DashboardTemplate;

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let settings = &state.dashboard;
    DashboardTemplate {
        observer: state.observer.to_string(),
        width: settings.width,
        height: settings.height,
        outline: settings.outline.to_string(),
        alpha: settings.alpha,
        picked: settings.picked.to_string(),
        poll_ms: settings.poll_ms,
    }
}
