pub mod book_repository;
pub mod event_bus;
pub mod order_repository;
pub mod realtime_port;
pub mod review_repository;
pub mod session_store;
pub mod user_repository;
