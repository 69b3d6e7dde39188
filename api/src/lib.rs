// Module layout (Clean Architecture style)
// - bootstrap: configuration, startup context and process lifecycle
// - infrastructure: DB/session/crypto/event bus/realtime/scheduler adapters
// - presentation: request pipeline, HTTP/WS handlers and routing
// - application: ports, use cases and event subscribers
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
