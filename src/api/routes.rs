use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::*;

pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/cogserv/about", get(about))
        .route("/cogserv/:bucket/*rest", get(render))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .layer(CorsLayer::permissive()),
        )
}
