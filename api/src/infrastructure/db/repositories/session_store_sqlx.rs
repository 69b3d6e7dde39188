use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::types::Json;

use crate::application::ports::session_store::{SessionData, SessionRecord, SessionStore};
use crate::infrastructure::db::PgPool;

/// Sessions persisted alongside the rest of the data so they survive restarts.
pub struct SqlxSessionStore {
    pub pool: PgPool,
}

impl SqlxSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqlxSessionStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let row = sqlx::query(
            r#"SELECT id, data, expires_at FROM sessions WHERE id = $1 AND expires_at > now()"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| {
            let data: Json<SessionData> = r.try_get("data").context("session_data_decode")?;
            Ok(SessionRecord {
                id: r.get("id"),
                data: data.0,
                expires_at: r.get("expires_at"),
            })
        })
        .transpose()
    }

    async fn set(&self, record: &SessionRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions (id, data, expires_at) VALUES ($1, $2, $3)
               ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at"#,
        )
        .bind(&record.id)
        .bind(Json(&record.data))
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = $2 WHERE id = $1")
            .bind(id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
