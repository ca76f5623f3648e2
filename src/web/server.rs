use axum::{routing::get, routing::post, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::interaction as interaction_handlers;
use super::api::sky as sky_handlers;
use super::api::sources as source_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::dashboard))
        // Sky API endpoints
        .route("/api/frame", get(sky_handlers::frame))
        .route("/api/tracked", get(sky_handlers::tracked))
        .route("/api/sources", get(source_handlers::list))
        // Interaction API endpoints
        .route("/api/pick", post(interaction_handlers::pick))
        .route("/api/click", post(interaction_handlers::click))
        .route("/api/close", post(interaction_handlers::close))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until the shared shutdown signal fires.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}

pub async fn run_server(state: AppState, bind_addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("Starting server on http://{}", listener.local_addr()?);
    serve(listener, state).await
}
