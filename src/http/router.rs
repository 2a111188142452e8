//! Router assembly.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route(
            "/tours",
            get(handlers::list_tours).post(handlers::create_tour),
        )
        .route(
            "/tours/{id}",
            get(handlers::get_tour)
                .put(handlers::update_tour)
                .delete(handlers::delete_tour),
        )
        .route("/tours/{id}/cancel", post(handlers::cancel_tour))
        .route("/tours/{id}/complete", post(handlers::complete_tour))
        .route("/tours/{id}/no-show", post(handlers::no_show_tour))
        .route(
            "/properties",
            get(handlers::list_properties).post(handlers::create_property),
        )
        .route(
            "/properties/{id}",
            get(handlers::get_property).delete(handlers::delete_property),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}
