use std::sync::Arc;

pub const ORDER_PLACED: &str = "orderPlaced";

/// A named signal with its payload. Lives only for the duration of a dispatch.
#[derive(Debug, Clone)]
pub struct DomainEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

impl DomainEvent {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

pub trait EventHandler: Send + Sync {
    fn name(&self) -> &str;
    /// Called synchronously from `publish`. Long-running work should be spawned.
    fn handle(&self, event: &DomainEvent) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

pub trait EventBus: Send + Sync {
    /// Registers `handler` for future publishes of `event`. There is no replay.
    fn subscribe(&self, event: &str, handler: Arc<dyn EventHandler>);
    /// Invokes every handler registered for `event.name`, in registration order.
    /// A failing handler never stops the others and never reaches the caller.
    fn publish(&self, event: &DomainEvent) -> PublishReport;
}
