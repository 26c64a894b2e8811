use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested analytics event. `metadata` is free-form client JSON kept
/// opaque all the way to the wire.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub app_id: String,
    pub event_name: String,
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub device: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Event payload as accepted at ingestion; id and timestamp are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_name: String,
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub device: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCount {
    pub device: Option<String>,
    pub count: i64,
}

/// Aggregate answer for one event name over a date range. This is exactly
/// the shape stored in the response cache. The `uniqueUsers`/`deviceData`
/// wire names predate this crate and are kept for existing clients, like
/// the cache key formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub event: String,
    pub count: i64,
    #[serde(rename = "uniqueUsers")]
    pub unique_visitors: i64,
    #[serde(rename = "deviceData")]
    pub devices: Vec<DeviceCount>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageCount {
    pub url: String,
    pub count: i64,
}
