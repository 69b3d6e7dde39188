use anyhow::Context;
use async_trait::async_trait;

use crate::infrastructure::db::{PgPool, schema};

/// One-shot startup work that must finish before the listener binds.
#[async_trait]
pub trait Bootstrapper: Send + Sync {
    async fn run(&self) -> anyhow::Result<()>;
}

/// Creates every table the server needs, then proves the store is reachable.
pub struct StoreBootstrap {
    pool: PgPool,
}

impl StoreBootstrap {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Bootstrapper for StoreBootstrap {
    async fn run(&self) -> anyhow::Result<()> {
        let pool = &self.pool;
        // Order matters: orders and reviews reference users and books.
        schema::ensure_users(pool).await.context("ensure_users")?;
        tracing::debug!(step = "ensure_users", "bootstrap_step_done");
        schema::ensure_books(pool).await.context("ensure_books")?;
        tracing::debug!(step = "ensure_books", "bootstrap_step_done");
        schema::ensure_orders(pool).await.context("ensure_orders")?;
        tracing::debug!(step = "ensure_orders", "bootstrap_step_done");
        schema::ensure_reviews(pool).await.context("ensure_reviews")?;
        tracing::debug!(step = "ensure_reviews", "bootstrap_step_done");
        schema::ensure_sessions(pool).await.context("ensure_sessions")?;
        tracing::debug!(step = "ensure_sessions", "bootstrap_step_done");
        schema::ping(pool).await.context("ping")?;
        tracing::info!("store_ready");
        Ok(())
    }
}
