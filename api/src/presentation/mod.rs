pub mod docs;
pub mod http;
pub mod pipeline;
pub mod router;
pub mod ws;
