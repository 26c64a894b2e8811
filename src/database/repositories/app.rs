use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::entities::app::{AppRecord, NewApp};
use crate::database::{IdentityStore, StoreError};

/// Postgres-backed identity store.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create_app(&self, app: NewApp) -> Result<AppRecord, StoreError> {
        let record = sqlx::query_as::<_, AppRecord>(
            r#"
            INSERT INTO apps (id, name, owner_email, api_key, is_revoked, expires_at)
            VALUES ($1, $2, $3, $4, false, $5)
            RETURNING id, name, owner_email, api_key, is_revoked, expires_at, created_at
            "#,
        )
        .bind(&app.id)
        .bind(&app.name)
        .bind(&app.owner_email)
        .bind(&app.api_key)
        .bind(app.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<AppRecord>, StoreError> {
        let record = sqlx::query_as::<_, AppRecord>(
            r#"
            SELECT id, name, owner_email, api_key, is_revoked, expires_at, created_at
            FROM apps
            WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError> {
        let record = sqlx::query_as::<_, AppRecord>(
            r#"
            SELECT id, name, owner_email, api_key, is_revoked, expires_at, created_at
            FROM apps
            WHERE id = $1
            "#,
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError> {
        // The is_revoked guard makes the flip one-way and the operation
        // idempotent even under racing revokes.
        let record = sqlx::query_as::<_, AppRecord>(
            r#"
            UPDATE apps
            SET is_revoked = true
            WHERE id = $1 AND is_revoked = false
            RETURNING id, name, owner_email, api_key, is_revoked, expires_at, created_at
            "#,
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
