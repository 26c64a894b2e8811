//! Cache key derivation. The formats are part of the external contract
//! (shared with existing deployments and asserted by tests) and must not
//! change.

/// Credential-to-tenant resolver cache.
const API_KEY_PREFIX: &str = "apiKey:";

/// Tenant-to-credential lookup cache.
const APP_ID_PREFIX: &str = "appId:";

/// Fixed-window rate counters.
const RATE_PREFIX: &str = "rate:";

/// Cached event-summary responses.
const SUMMARY_PREFIX: &str = "summary:";

pub fn api_key_key(api_key: &str) -> String {
    format!("{}{}", API_KEY_PREFIX, api_key)
}

pub fn app_id_key(app_id: &str) -> String {
    format!("{}{}", APP_ID_PREFIX, app_id)
}

pub fn rate_key(api_key: &str) -> String {
    format!("{}{}", RATE_PREFIX, api_key)
}

/// Absent date bounds encode as empty segments so the same query shape
/// always maps to the same key.
pub fn summary_key(
    app_id: &str,
    event_name: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> String {
    format!(
        "{}{}:{}:{}:{}",
        SUMMARY_PREFIX,
        app_id,
        event_name,
        start_date.unwrap_or(""),
        end_date.unwrap_or("")
    )
}
