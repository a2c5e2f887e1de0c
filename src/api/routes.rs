use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware, require_user};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes(state.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Authenticated routes under /api/v1
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Catalog
        .route(
            "/series",
            get(handlers::series::list_series).post(handlers::series::create_series),
        )
        // Personal list
        .route("/library", post(handlers::library::add_to_list))
        .route("/library/:id/advance", post(handlers::library::advance))
        // Watch sessions
        .route(
            "/sessions",
            get(handlers::sessions::list_sessions).post(handlers::sessions::schedule),
        )
        .route("/sessions/:id/complete", post(handlers::sessions::complete))
        .route("/sessions/:id/skip", post(handlers::sessions::skip))
        // Calendar
        .route("/calendar", get(handlers::calendar::week))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}
