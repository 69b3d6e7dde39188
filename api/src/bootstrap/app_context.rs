use std::sync::Arc;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::event_bus::EventBus;
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::application::ports::session_store::SessionStore;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::infrastructure::realtime::RealtimeChannel;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    book_repo: Arc<dyn BookRepository>,
    review_repo: Arc<dyn ReviewRepository>,
    order_repo: Arc<dyn OrderRepository>,
    session_store: Arc<dyn SessionStore>,
    events: Arc<dyn EventBus>,
    realtime: RealtimeChannel,
}

impl AppServices {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        book_repo: Arc<dyn BookRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        order_repo: Arc<dyn OrderRepository>,
        session_store: Arc<dyn SessionStore>,
        events: Arc<dyn EventBus>,
        realtime: RealtimeChannel,
    ) -> Self {
        Self {
            user_repo,
            book_repo,
            review_repo,
            order_repo,
            session_store,
            events,
            realtime,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn book_repo(&self) -> Arc<dyn BookRepository> {
        self.services.book_repo.clone()
    }

    pub fn review_repo(&self) -> Arc<dyn ReviewRepository> {
        self.services.review_repo.clone()
    }

    pub fn order_repo(&self) -> Arc<dyn OrderRepository> {
        self.services.order_repo.clone()
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        self.services.session_store.clone()
    }

    pub fn events(&self) -> Arc<dyn EventBus> {
        self.services.events.clone()
    }

    pub fn realtime(&self) -> &RealtimeChannel {
        &self.services.realtime
    }
}
