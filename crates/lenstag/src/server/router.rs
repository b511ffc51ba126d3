use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = app_state.config.server.max_upload_bytes();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/lensTag",
            post(handlers::lens_tag_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .fallback(handlers::not_found)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
