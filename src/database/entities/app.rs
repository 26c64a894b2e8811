use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered tenant and its credential. Immutable once issued except for
/// `is_revoked`, which only ever flips to true.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub id: String,
    pub name: String,
    pub owner_email: String,
    pub api_key: String,
    pub is_revoked: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AppRecord {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Clone)]
pub struct NewApp {
    pub id: String,
    pub name: String,
    pub owner_email: String,
    pub api_key: String,
    pub expires_at: Option<DateTime<Utc>>,
}
