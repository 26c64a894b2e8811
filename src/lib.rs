use std::sync::Arc;

use config::Config;

use crate::cache::store::CacheStore;
use crate::database::{AnalyticsStore, IdentityStore};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

/// Shared handles injected into every handler and middleware. The stores are
/// trait objects so tests can substitute in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityStore>,
    pub analytics: Arc<dyn AnalyticsStore>,
    pub cache: Arc<dyn CacheStore>,
    pub config: Config,
}
