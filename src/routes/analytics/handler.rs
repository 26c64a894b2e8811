use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{
    AppState,
    cache::keys,
    cache::operations::summary::SummaryCacheOperations,
    database::DateRange,
    database::entities::event::NewEvent,
    error::AppError,
    middleware::TenantId,
};

use super::model::{
    CollectRequest, CollectResponse, DailyStatsQuery, DeviceDetails, SummaryQuery, TopPagesQuery,
    UserStatsQuery, UserStatsResponse,
};

/// Ingests one event for the calling tenant. Writes go straight to the
/// analytics store; nothing on this path is cached.
pub async fn collect(
    State(state): State<AppState>,
    Extension(TenantId(app_id)): Extension<TenantId>,
    Json(req): Json<CollectRequest>,
) -> Result<Response, AppError> {
    let event_name = req
        .event_name
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput("eventName required".to_string()))?;

    let event = state
        .analytics
        .insert_event(
            &app_id,
            NewEvent {
                event_name,
                url: req.url,
                referrer: req.referrer,
                device: req.device,
                ip_address: req.ip_address,
                metadata: req.metadata,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CollectResponse {
            message: "Event collected",
            event,
        }),
    )
        .into_response())
}

/// Aggregate counts for one event name, served through the response cache.
/// The cache key is the deterministic serialization of the query shape, so
/// identical queries inside the TTL share one computation's result.
pub async fn event_summary(
    State(state): State<AppState>,
    Extension(TenantId(app_id)): Extension<TenantId>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, AppError> {
    let event_name = query
        .event_name
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput("eventName required".to_string()))?;

    let range = DateRange {
        start: query
            .start_date
            .as_deref()
            .map(|raw| parse_date("startDate", raw))
            .transpose()?,
        end: query
            .end_date
            .as_deref()
            .map(|raw| parse_date("endDate", raw))
            .transpose()?,
    };

    let cache_key = keys::summary_key(
        &app_id,
        &event_name,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );

    if let Some(summary) = SummaryCacheOperations::get(&state.cache, &cache_key).await {
        return Ok(Json(summary).into_response());
    }

    let summary = state
        .analytics
        .event_summary(&app_id, &event_name, range)
        .await?;

    SummaryCacheOperations::put(
        &state.cache,
        &cache_key,
        &summary,
        state.config.summary_cache_ttl_secs,
    )
    .await;

    Ok(Json(summary).into_response())
}

/// Recent activity for one visitor. Visitors are keyed by IP address on
/// both the ingestion and query paths.
pub async fn user_stats(
    State(state): State<AppState>,
    Extension(TenantId(app_id)): Extension<TenantId>,
    Query(query): Query<UserStatsQuery>,
) -> Result<Response, AppError> {
    let Some(user_ip) = query
        .user_ip
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Err(AppError::InvalidInput("userIp required".to_string()));
    };

    let events = state
        .analytics
        .events_for_visitor(&app_id, &user_ip, 20)
        .await?;

    if events.is_empty() {
        return Ok(Json(serde_json::json!({ "message": "No events for this user" }))
            .into_response());
    }

    // Events arrive newest first, so the head carries the freshest device
    // metadata.
    let latest = events[0].metadata.as_ref();
    let device_details = DeviceDetails {
        browser: metadata_field(latest, "browser"),
        os: metadata_field(latest, "os"),
    };

    Ok(Json(UserStatsResponse {
        ip_address: user_ip,
        total_events: events.len(),
        recent_events: events,
        device_details,
    })
    .into_response())
}

fn metadata_field(metadata: Option<&serde_json::Value>, key: &str) -> Option<String> {
    metadata?.get(key)?.as_str().map(str::to_string)
}

pub async fn daily_stats(
    State(state): State<AppState>,
    Extension(TenantId(app_id)): Extension<TenantId>,
    Query(query): Query<DailyStatsQuery>,
) -> Result<Response, AppError> {
    // Bounded above as well: a huge value would overflow the duration math
    // before the store ever saw it.
    let days = query.days.unwrap_or(7);
    if !(1..=365).contains(&days) {
        return Err(AppError::InvalidInput(
            "days must be between 1 and 365".to_string(),
        ));
    }

    let rows = state.analytics.daily_counts(&app_id, days).await?;
    Ok(Json(rows).into_response())
}

pub async fn top_pages(
    State(state): State<AppState>,
    Extension(TenantId(app_id)): Extension<TenantId>,
    Query(query): Query<TopPagesQuery>,
) -> Result<Response, AppError> {
    let limit = query.limit.unwrap_or(5);
    if limit < 1 {
        return Err(AppError::InvalidInput("limit must be positive".to_string()));
    }

    let rows = state.analytics.top_pages(&app_id, limit).await?;
    Ok(Json(rows).into_response())
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (interpreted as
/// UTC midnight).
fn parse_date(field: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(AppError::InvalidInput(format!(
        "{} must be an RFC 3339 timestamp or YYYY-MM-DD",
        field
    )))
}
