#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use analytics_backend::{
    AppState,
    cache::store::{CacheError, CacheStore, MemoryCacheStore},
    config::Config,
    database::entities::app::{AppRecord, NewApp},
    database::entities::event::{
        DailyCount, DeviceCount, EventRecord, EventSummary, NewEvent, PageCount,
    },
    database::{AnalyticsStore, DateRange, IdentityStore, StoreError},
    router::create_router,
};

/// Identity store double backed by a hash map.
#[derive(Default)]
pub struct MemoryIdentityStore {
    apps: Mutex<HashMap<String, AppRecord>>,
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create_app(&self, app: NewApp) -> Result<AppRecord, StoreError> {
        let record = AppRecord {
            id: app.id.clone(),
            name: app.name,
            owner_email: app.owner_email,
            api_key: app.api_key,
            is_revoked: false,
            expires_at: app.expires_at,
            created_at: Utc::now(),
        };
        self.apps.lock().unwrap().insert(app.id, record.clone());
        Ok(record)
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<AppRecord>, StoreError> {
        Ok(self
            .apps
            .lock()
            .unwrap()
            .values()
            .find(|app| app.api_key == api_key)
            .cloned())
    }

    async fn find_by_id(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError> {
        Ok(self.apps.lock().unwrap().get(app_id).cloned())
    }

    async fn revoke(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError> {
        let mut apps = self.apps.lock().unwrap();
        match apps.get_mut(app_id) {
            Some(app) if !app.is_revoked => {
                app.is_revoked = true;
                Ok(Some(app.clone()))
            }
            _ => Ok(None),
        }
    }
}

/// Analytics store double. Counts summary computations so tests can assert
/// on response-cache hits and misses.
#[derive(Default)]
pub struct MemoryAnalyticsStore {
    events: Mutex<Vec<EventRecord>>,
    pub summary_calls: AtomicUsize,
}

impl MemoryAnalyticsStore {
    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsStore for MemoryAnalyticsStore {
    async fn insert_event(&self, app_id: &str, event: NewEvent) -> Result<EventRecord, StoreError> {
        let record = EventRecord {
            id: Uuid::new_v4().to_string(),
            app_id: app_id.to_string(),
            event_name: event.event_name,
            url: event.url,
            referrer: event.referrer,
            device: event.device,
            ip_address: event.ip_address,
            metadata: event.metadata,
            timestamp: Utc::now(),
        };
        self.events.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn event_summary(
        &self,
        app_id: &str,
        event_name: &str,
        range: DateRange,
    ) -> Result<EventSummary, StoreError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);

        let events = self.events.lock().unwrap();
        let matching: Vec<_> = events
            .iter()
            .filter(|e| e.app_id == app_id && e.event_name == event_name)
            .filter(|e| range.start.is_none_or(|s| e.timestamp >= s))
            .filter(|e| range.end.is_none_or(|s| e.timestamp <= s))
            .collect();

        let mut visitors: Vec<&str> = matching
            .iter()
            .filter_map(|e| e.ip_address.as_deref())
            .collect();
        visitors.sort_unstable();
        visitors.dedup();

        let mut by_device: HashMap<Option<String>, i64> = HashMap::new();
        for event in &matching {
            *by_device.entry(event.device.clone()).or_default() += 1;
        }
        let mut devices: Vec<DeviceCount> = by_device
            .into_iter()
            .map(|(device, count)| DeviceCount { device, count })
            .collect();
        devices.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(EventSummary {
            event: event_name.to_string(),
            count: matching.len() as i64,
            unique_visitors: visitors.len() as i64,
            devices,
        })
    }

    async fn events_for_visitor(
        &self,
        app_id: &str,
        ip_address: &str,
        limit: i64,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let mut matching: Vec<EventRecord> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.app_id == app_id && e.ip_address.as_deref() == Some(ip_address))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn daily_counts(&self, app_id: &str, days: i64) -> Result<Vec<DailyCount>, StoreError> {
        let since = Utc::now() - chrono::Duration::days(days);
        let mut by_day: HashMap<String, i64> = HashMap::new();
        for event in self.events.lock().unwrap().iter() {
            if event.app_id == app_id && event.timestamp >= since {
                *by_day
                    .entry(event.timestamp.format("%Y-%m-%d").to_string())
                    .or_default() += 1;
            }
        }
        let mut rows: Vec<DailyCount> = by_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(30);
        Ok(rows)
    }

    async fn top_pages(&self, app_id: &str, limit: i64) -> Result<Vec<PageCount>, StoreError> {
        let mut by_url: HashMap<String, i64> = HashMap::new();
        for event in self.events.lock().unwrap().iter() {
            if event.app_id == app_id {
                if let Some(url) = &event.url {
                    *by_url.entry(url.clone()).or_default() += 1;
                }
            }
        }
        let mut rows: Vec<PageCount> = by_url
            .into_iter()
            .map(|(url, count)| PageCount { url, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.url.cmp(&b.url)));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

/// Cache store double where every operation fails, for exercising the
/// degraded-cache paths: the resolver must fall through to the identity
/// store and the rate limiter must fail open.
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::new("cache store is down"))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), CacheError> {
        Err(CacheError::new("cache store is down"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::new("cache store is down"))
    }

    async fn incr_with_expiry(&self, _key: &str, _window_secs: u64) -> Result<i64, CacheError> {
        Err(CacheError::new("cache store is down"))
    }
}

pub struct TestHarness {
    pub app: Router,
    pub state: AppState,
    pub analytics: Arc<MemoryAnalyticsStore>,
}

pub fn harness() -> TestHarness {
    harness_with(Config::default())
}

pub fn harness_with(config: Config) -> TestHarness {
    build_harness(config, Arc::new(MemoryCacheStore::new()))
}

pub fn harness_with_failing_cache() -> TestHarness {
    build_harness(Config::default(), Arc::new(FailingCacheStore))
}

fn build_harness(config: Config, cache: Arc<dyn CacheStore>) -> TestHarness {
    let analytics = Arc::new(MemoryAnalyticsStore::default());
    let state = AppState {
        identity: Arc::new(MemoryIdentityStore::default()),
        analytics: analytics.clone(),
        cache,
        config,
    };
    TestHarness {
        app: create_router(state.clone()),
        state,
        analytics,
    }
}

impl TestHarness {
    pub async fn post_json(
        &self,
        path: &str,
        api_key: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn get(&self, path: &str, api_key: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Registers a tenant and returns `(app_id, api_key)`.
    pub async fn register(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .post_json(
                "/api/auth/register",
                None,
                serde_json::json!({ "name": name, "ownerEmail": "owner@test.com" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            body["id"].as_str().unwrap().to_string(),
            body["apiKey"].as_str().unwrap().to_string(),
        )
    }
}
