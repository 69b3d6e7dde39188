use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::{error, info};

use bookstore_api::application::ports::event_bus::EventBus;
use bookstore_api::application::ports::session_store::SessionStore;
use bookstore_api::application::subscribers;
use bookstore_api::bootstrap::app_context::{AppContext, AppServices};
use bookstore_api::bootstrap::config::Config;
use bookstore_api::bootstrap::lifecycle::Lifecycle;
use bookstore_api::bootstrap::persistence::StoreBootstrap;
use bookstore_api::infrastructure::db::repositories::{
    book_repository_sqlx::SqlxBookRepository, order_repository_sqlx::SqlxOrderRepository,
    review_repository_sqlx::SqlxReviewRepository, session_store_sqlx::SqlxSessionStore,
    user_repository_sqlx::SqlxUserRepository,
};
use bookstore_api::infrastructure::events::InProcessEventBus;
use bookstore_api::infrastructure::realtime::{DEFAULT_CAPACITY, RealtimeChannel};
use bookstore_api::infrastructure::scheduler::{PurgeExpiredSessions, Scheduler};
use bookstore_api::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "bookstore_api=debug,axum=info,tower_http=info,sqlx=warn".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(port = cfg.port, frontend_url = ?cfg.frontend_url, production = cfg.is_production, "Starting bookstore backend");

    // Database. Connections are opened lazily; bootstrap proves the store is reachable.
    let pool = bookstore_api::infrastructure::db::connect_lazy(&cfg.database_url)?;

    // Event bus + realtime fan-out
    let realtime = RealtimeChannel::new(DEFAULT_CAPACITY);
    let events: Arc<dyn EventBus> = Arc::new(InProcessEventBus::new());
    subscribers::register_builtin(events.as_ref(), Arc::new(realtime.clone()));

    let session_store: Arc<dyn SessionStore> = Arc::new(SqlxSessionStore::new(pool.clone()));
    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        Arc::new(SqlxBookRepository::new(pool.clone())),
        Arc::new(SqlxReviewRepository::new(pool.clone())),
        Arc::new(SqlxOrderRepository::new(pool.clone())),
        session_store.clone(),
        events,
        realtime,
    );
    let ctx = AppContext::new(cfg.clone(), services);
    let app = router::build(&ctx);

    let mut scheduler = Scheduler::new();
    scheduler.register(Arc::new(PurgeExpiredSessions::new(
        session_store,
        Duration::from_secs(cfg.session_purge_interval_secs),
    )));

    let mut lifecycle = Lifecycle::new();
    if let Err(e) = lifecycle.bootstrap(&StoreBootstrap::new(pool.clone())).await {
        error!(error = ?e, "Bootstrap failed, refusing to listen");
        if let Err(e) = lifecycle.terminate() {
            error!(error = %e, "Lifecycle terminate failed");
        }
        std::process::exit(1);
    }

    let jobs = scheduler.start();
    info!(jobs = ?jobs.job_names(), "Scheduler started");

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = lifecycle.listen(addr).await?;
    info!(%addr, "HTTP API listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(?e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        })
        .await;

    jobs.shutdown();
    pool.close().await;
    if let Err(e) = served {
        error!(?e, "API server failed");
        return Err(e.into());
    }
    Ok(())
}
