use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use entities::app::{AppRecord, NewApp};
use entities::event::{DailyCount, EventRecord, EventSummary, NewEvent, PageCount};

pub mod entities;
pub mod repositories;

/// Failure in an authoritative store. Unlike cache errors there is no
/// fallback; the request surfaces a server error.
#[derive(Debug)]
pub struct StoreError(String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// Source of truth for tenant credentials.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_app(&self, app: NewApp) -> Result<AppRecord, StoreError>;

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<AppRecord>, StoreError>;

    async fn find_by_id(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError>;

    /// One-way revocation. Returns `None` if the app does not exist or was
    /// already revoked, so repeated revokes are a definitive no-op.
    async fn revoke(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError>;
}

/// Inclusive time bounds for aggregate queries; `None` leaves that side
/// unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Source of truth for ingested events and the aggregate queries over them.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn insert_event(&self, app_id: &str, event: NewEvent) -> Result<EventRecord, StoreError>;

    async fn event_summary(
        &self,
        app_id: &str,
        event_name: &str,
        range: DateRange,
    ) -> Result<EventSummary, StoreError>;

    /// Most recent events for one visitor, newest first.
    async fn events_for_visitor(
        &self,
        app_id: &str,
        ip_address: &str,
        limit: i64,
    ) -> Result<Vec<EventRecord>, StoreError>;

    /// Per-day event counts since `days` days ago, newest first.
    async fn daily_counts(&self, app_id: &str, days: i64) -> Result<Vec<DailyCount>, StoreError>;

    /// Most-hit URLs for the tenant, descending by count.
    async fn top_pages(&self, app_id: &str, limit: i64) -> Result<Vec<PageCount>, StoreError>;
}
