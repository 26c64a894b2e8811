use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    middleware::{RateLimiter, api_key_auth, log_errors, rate_limit},
    routes,
};

/// Key management and onboarding. These routes are how tenants obtain
/// credentials, so they carry no API-key gate themselves.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(routes::auth::handler::register))
        .route("/auth/api-key", get(routes::auth::handler::get_api_key))
        .route("/auth/revoke", post(routes::auth::handler::revoke))
}

/// Event ingestion and queries. Every route runs the admission pipeline:
/// credential resolution first, then the route group's rate budget, then
/// the handler. The write path gets the strict quota, reads the loose one.
fn analytics_routes(state: AppState) -> Router<AppState> {
    let collect_limiter = Arc::new(RateLimiter::new(
        state.cache.clone(),
        state.config.collect_quota(),
    ));
    let read_limiter = Arc::new(RateLimiter::new(
        state.cache.clone(),
        state.config.read_quota(),
    ));

    let write_routes = Router::new()
        .route("/analytics/collect", post(routes::analytics::handler::collect))
        .route_layer(from_fn_with_state(collect_limiter, rate_limit));

    let read_routes = Router::new()
        .route(
            "/analytics/event-summary",
            get(routes::analytics::handler::event_summary),
        )
        .route(
            "/analytics/user-stats",
            get(routes::analytics::handler::user_stats),
        )
        .route(
            "/analytics/daily-stats",
            get(routes::analytics::handler::daily_stats),
        )
        .route(
            "/analytics/top-pages",
            get(routes::analytics::handler::top_pages),
        )
        .route_layer(from_fn_with_state(read_limiter, rate_limit));

    // Layers added later run first: auth wraps the limiters, so an invalid
    // key is rejected before it consumes any rate budget.
    write_routes
        .merge(read_routes)
        .route_layer(from_fn_with_state(state, api_key_auth))
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(analytics_routes(state.clone()));

    Router::new()
        .nest(&state.config.api_base_uri, api)
        .layer(axum::middleware::from_fn(log_errors))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
