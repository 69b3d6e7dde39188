use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::ScheduledJob;
use crate::application::ports::session_store::SessionStore;

pub struct PurgeExpiredSessions {
    store: Arc<dyn SessionStore>,
    every: Duration,
}

impl PurgeExpiredSessions {
    pub fn new(store: Arc<dyn SessionStore>, every: Duration) -> Self {
        Self { store, every }
    }
}

#[async_trait]
impl ScheduledJob for PurgeExpiredSessions {
    fn name(&self) -> &'static str {
        "purge_expired_sessions"
    }

    fn interval(&self) -> Duration {
        self.every
    }

    async fn run(&self) -> anyhow::Result<()> {
        let purged = self.store.purge_expired().await?;
        if purged > 0 {
            tracing::info!(purged, "expired_sessions_purged");
        }
        Ok(())
    }
}
