use serde::{Deserialize, Serialize};

use crate::database::entities::event::EventRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub event_name: Option<String>,
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub device: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub message: &'static str,
    pub event: EventRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub event_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsQuery {
    pub user_ip: Option<String>,
}

/// Browser/OS of the visitor's most recent event, projected out of its
/// free-form metadata; both null when the event carried none.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetails {
    pub browser: Option<String>,
    pub os: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub ip_address: String,
    pub total_events: usize,
    pub recent_events: Vec<EventRecord>,
    pub device_details: DeviceDetails,
}

#[derive(Debug, Deserialize)]
pub struct DailyStatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TopPagesQuery {
    pub limit: Option<i64>,
}
