use axum::http::{header::CONTENT_TYPE, Method};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all punch endpoints.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/clock",
            post(handler::clock_handler).fallback(handler::post_only),
        )
        .route(
            "/events",
            get(handler::events_handler).fallback(handler::get_only),
        )
        .route(
            "/latest",
            get(handler::latest_handler).fallback(handler::get_only),
        )
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .layer(TraceLayer::new_for_http());

    if state.config.cors_allow_any_origin {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE]),
        );
    }

    router.with_state(state)
}
