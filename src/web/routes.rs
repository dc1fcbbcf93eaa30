//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Catalog
        .route(
            "/api/domains",
            get(handlers::list_domains).post(handlers::add_domain),
        )
        .route("/api/domains/:id", delete(handlers::remove_domain))
        // Search
        .route("/api/search", get(handlers::search))
        .route("/api/search/smart", get(handlers::smart_search))
        .route("/autocomplete", get(handlers::autocomplete))
        // Service
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .layer(cors)
        .with_state(state)
}
