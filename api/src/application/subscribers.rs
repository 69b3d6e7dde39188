use std::sync::Arc;

use crate::application::ports::event_bus::{DomainEvent, EventBus, EventHandler, ORDER_PLACED};
use crate::application::ports::realtime_port::{Notification, RealtimePort};

/// Logs every placed order it sees.
pub struct OrderPlacedLogger;

impl EventHandler for OrderPlacedLogger {
    fn name(&self) -> &str {
        "order_placed_logger"
    }

    fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        tracing::info!(event = %event.name, order = %event.payload, "Order placed event received");
        Ok(())
    }
}

/// Forwards bus events to connected websocket clients.
pub struct RealtimeBroadcaster {
    realtime: Arc<dyn RealtimePort>,
}

impl RealtimeBroadcaster {
    pub fn new(realtime: Arc<dyn RealtimePort>) -> Self {
        Self { realtime }
    }
}

impl EventHandler for RealtimeBroadcaster {
    fn name(&self) -> &str {
        "realtime_broadcaster"
    }

    fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        let receivers = self.realtime.broadcast(Notification {
            event: event.name.clone(),
            payload: event.payload.clone(),
        });
        tracing::debug!(event = %event.name, receivers, "realtime_broadcast");
        Ok(())
    }
}

/// Wires the subscribers every process starts with.
pub fn register_builtin(bus: &dyn EventBus, realtime: Arc<dyn RealtimePort>) {
    bus.subscribe(ORDER_PLACED, Arc::new(OrderPlacedLogger));
    bus.subscribe(ORDER_PLACED, Arc::new(RealtimeBroadcaster::new(realtime)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::events::InProcessEventBus;
    use crate::infrastructure::realtime::RealtimeChannel;

    #[tokio::test]
    async fn order_placed_reaches_sockets() {
        let bus = InProcessEventBus::new();
        let channel = Arc::new(RealtimeChannel::new(8));
        let mut rx = channel.subscribe();
        register_builtin(&bus, channel.clone());

        let report = bus.publish(&DomainEvent::new(
            ORDER_PLACED,
            serde_json::json!({ "id": "o-1" }),
        ));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 0);

        let note = rx.recv().await.unwrap();
        assert_eq!(note.event, ORDER_PLACED);
        assert_eq!(note.payload["id"], "o-1");
    }
}
