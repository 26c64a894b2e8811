use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::entities::event::{
    DailyCount, DeviceCount, EventRecord, EventSummary, NewEvent, PageCount,
};
use crate::database::{AnalyticsStore, DateRange, StoreError};

/// Postgres-backed analytics store.
pub struct PgAnalyticsStore {
    pool: PgPool,
}

impl PgAnalyticsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsStore for PgAnalyticsStore {
    async fn insert_event(&self, app_id: &str, event: NewEvent) -> Result<EventRecord, StoreError> {
        let record = sqlx::query_as::<_, EventRecord>(
            r#"
            INSERT INTO events (id, app_id, event_name, url, referrer, device, ip_address, metadata, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, app_id, event_name, url, referrer, device, ip_address, metadata, timestamp
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(app_id)
        .bind(&event.event_name)
        .bind(&event.url)
        .bind(&event.referrer)
        .bind(&event.device)
        .bind(&event.ip_address)
        .bind(&event.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn event_summary(
        &self,
        app_id: &str,
        event_name: &str,
        range: DateRange,
    ) -> Result<EventSummary, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM events
            WHERE app_id = $1 AND event_name = $2
              AND ($3::timestamptz IS NULL OR timestamp >= $3)
              AND ($4::timestamptz IS NULL OR timestamp <= $4)
            "#,
        )
        .bind(app_id)
        .bind(event_name)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let unique_visitors: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT ip_address) FROM events
            WHERE app_id = $1 AND event_name = $2
              AND ($3::timestamptz IS NULL OR timestamp >= $3)
              AND ($4::timestamptz IS NULL OR timestamp <= $4)
            "#,
        )
        .bind(app_id)
        .bind(event_name)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let devices = sqlx::query_as::<_, DeviceCount>(
            r#"
            SELECT device, COUNT(*) AS count FROM events
            WHERE app_id = $1 AND event_name = $2
              AND ($3::timestamptz IS NULL OR timestamp >= $3)
              AND ($4::timestamptz IS NULL OR timestamp <= $4)
            GROUP BY device
            ORDER BY count DESC
            "#,
        )
        .bind(app_id)
        .bind(event_name)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(EventSummary {
            event: event_name.to_string(),
            count,
            unique_visitors,
            devices,
        })
    }

    async fn events_for_visitor(
        &self,
        app_id: &str,
        ip_address: &str,
        limit: i64,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let records = sqlx::query_as::<_, EventRecord>(
            r#"
            SELECT id, app_id, event_name, url, referrer, device, ip_address, metadata, timestamp
            FROM events
            WHERE app_id = $1 AND ip_address = $2
            ORDER BY timestamp DESC
            LIMIT $3
            "#,
        )
        .bind(app_id)
        .bind(ip_address)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn daily_counts(&self, app_id: &str, days: i64) -> Result<Vec<DailyCount>, StoreError> {
        let since = Utc::now() - Duration::days(days);

        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT to_char(date_trunc('day', timestamp), 'YYYY-MM-DD') AS date,
                   COUNT(*) AS count
            FROM events
            WHERE app_id = $1 AND timestamp >= $2
            GROUP BY 1
            ORDER BY 1 DESC
            LIMIT 30
            "#,
        )
        .bind(app_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn top_pages(&self, app_id: &str, limit: i64) -> Result<Vec<PageCount>, StoreError> {
        let rows = sqlx::query_as::<_, PageCount>(
            r#"
            SELECT url, COUNT(*) AS count
            FROM events
            WHERE app_id = $1 AND url IS NOT NULL
            GROUP BY url
            ORDER BY count DESC, url ASC
            LIMIT $2
            "#,
        )
        .bind(app_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
