use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    AppState,
    cache::operations::api_key::ApiKeyCacheOperations,
    database::entities::app::NewApp,
    error::AppError,
};

use super::model::{
    ApiKeyQuery, ApiKeyResponse, RegisterRequest, RegisterResponse, RevokeRequest, RevokeResponse,
};

fn required(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Registers a tenant and issues its API key. Both cache mappings are
/// primed immediately so the first authenticated request does not pay the
/// identity-store round trip.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let (Some(name), Some(owner_email)) = (required(req.name), required(req.owner_email)) else {
        return Err(AppError::InvalidInput(
            "name and ownerEmail required".to_string(),
        ));
    };

    let app = state
        .identity
        .create_app(NewApp {
            id: Uuid::new_v4().to_string(),
            name,
            owner_email,
            api_key: Uuid::new_v4().to_string(),
            expires_at: Some(Utc::now() + Duration::days(state.config.api_key_expiry_days)),
        })
        .await?;

    tracing::info!("registered app {} ({})", app.id, app.name);

    ApiKeyCacheOperations::put_mapping(
        &state.cache,
        &app.api_key,
        &app.id,
        state.config.api_key_cache_ttl_secs,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: app.id,
            api_key: app.api_key,
        }),
    )
        .into_response())
}

/// Returns the tenant's current API key, cache-aside over `appId:<id>`.
pub async fn get_api_key(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Response, AppError> {
    let Some(app_id) = required(query.app_id) else {
        return Err(AppError::InvalidInput("appId required".to_string()));
    };

    if let Some(api_key) = ApiKeyCacheOperations::get_api_key(&state.cache, &app_id).await {
        return Ok(Json(ApiKeyResponse {
            api_key,
            source: "redis",
        })
        .into_response());
    }

    let app = state
        .identity
        .find_by_id(&app_id)
        .await?
        .filter(|app| !app.is_revoked)
        .ok_or(AppError::NotFound("App not found"))?;

    ApiKeyCacheOperations::put_mapping(
        &state.cache,
        &app.api_key,
        &app.id,
        state.config.api_key_cache_ttl_secs,
    )
    .await;

    Ok(Json(ApiKeyResponse {
        api_key: app.api_key,
        source: "db",
    })
    .into_response())
}

/// One-way key revocation. Cache eviction is best-effort: a failed evict
/// leaves the key resolving until the resolver-cache TTL lapses, which is
/// the documented staleness bound, and never fails the revoke itself.
pub async fn revoke(
    State(state): State<AppState>,
    Json(req): Json<RevokeRequest>,
) -> Result<Response, AppError> {
    let api_key = required(req.api_key);
    let app_id = required(req.app_id);

    let app = match (&api_key, &app_id) {
        (None, None) => {
            return Err(AppError::InvalidInput(
                "apiKey or appId required".to_string(),
            ));
        }
        (Some(key), _) => state.identity.find_by_api_key(key).await?,
        (None, Some(id)) => state.identity.find_by_id(id).await?,
    };

    let not_found = AppError::NotFound("API key not found, already revoked, or invalid ownership");

    let Some(app) = app else {
        return Err(not_found);
    };
    // When both identifiers are supplied they must refer to the same app.
    if app_id.as_ref().is_some_and(|id| *id != app.id) {
        return Err(not_found);
    }

    let Some(revoked) = state.identity.revoke(&app.id).await? else {
        return Err(not_found);
    };

    ApiKeyCacheOperations::evict_mapping(&state.cache, &revoked.api_key, &revoked.id).await;

    tracing::info!("revoked api key for app {}", revoked.id);

    Ok(Json(RevokeResponse {
        message: "API key revoked successfully",
        app_id: revoked.id,
        api_key: revoked.api_key,
    })
    .into_response())
}
