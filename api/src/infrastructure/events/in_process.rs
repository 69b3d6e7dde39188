use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::application::ports::event_bus::{DomainEvent, EventBus, EventHandler, PublishReport};

/// Process-local named-event dispatcher.
///
/// Handlers run synchronously inside [`EventBus::publish`], in the order they
/// were registered. The handler list is snapshotted before dispatch, so a
/// handler may subscribe further handlers without deadlocking; those only see
/// later publishes.
#[derive(Default)]
pub struct InProcessEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map(Vec::len).unwrap_or(0)
    }
}

impl EventBus for InProcessEventBus {
    fn subscribe(&self, event: &str, handler: Arc<dyn EventHandler>) {
        tracing::debug!(event, handler = handler.name(), "event_subscribe");
        self.handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn publish(&self, event: &DomainEvent) -> PublishReport {
        let snapshot: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .get(&event.name)
            .cloned()
            .unwrap_or_default();

        let mut report = PublishReport::default();
        for handler in snapshot {
            match catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    tracing::warn!(event = %event.name, handler = handler.name(), error = ?err, "event_handler_failed");
                }
                Err(_) => {
                    report.failed += 1;
                    tracing::error!(event = %event.name, handler = handler.name(), "event_handler_panicked");
                }
            }
        }
        report
    }
}
