use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{
    AppState,
    cache::operations::api_key::ApiKeyCacheOperations,
    error::AppError,
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Tenant id resolved from the request's API key, forwarded to handlers as a
/// request extension.
#[derive(Debug, Clone)]
pub struct TenantId(pub String);

/// Admission gate for every analytics route: resolves the `x-api-key`
/// header to a tenant or rejects the request before any downstream stage
/// runs.
pub async fn api_key_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let Some(api_key) = api_key else {
        return Err(AppError::Unauthorized("API key missing"));
    };

    let app_id = resolve_api_key(&state, api_key).await?;
    req.extensions_mut().insert(TenantId(app_id));
    Ok(next.run(req).await)
}

/// Cache-aside credential resolution. A cache hit is trusted as-is (no
/// revocation re-check; staleness is bounded by the cache TTL). On a miss
/// the identity store decides, and valid keys are cached for next time.
/// Cache failures degrade to the identity store and are never fatal here.
pub async fn resolve_api_key(state: &AppState, api_key: &str) -> Result<String, AppError> {
    if let Some(app_id) = ApiKeyCacheOperations::get_app_id(&state.cache, api_key).await {
        return Ok(app_id);
    }

    let app = state
        .identity
        .find_by_api_key(api_key)
        .await?
        .ok_or(AppError::Unauthorized("Invalid API key"))?;

    if !app.is_valid(Utc::now()) {
        return Err(AppError::Unauthorized("Invalid API key"));
    }

    ApiKeyCacheOperations::put_app_id(
        &state.cache,
        api_key,
        &app.id,
        state.config.api_key_cache_ttl_secs,
    )
    .await;

    Ok(app.id)
}
