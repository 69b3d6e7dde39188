use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::users::Role;

/// Server-side state of one client session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub data: SessionData,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Key-value access to persisted sessions. Atomicity is whatever the backing
/// store provides per key; callers never hold in-process locks across calls.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<SessionRecord>>;
    async fn set(&self, record: &SessionRecord) -> anyhow::Result<()>;
    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
    /// Removes every expired record and returns how many were dropped.
    async fn purge_expired(&self) -> anyhow::Result<u64>;
}
