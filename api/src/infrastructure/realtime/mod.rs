use tokio::sync::broadcast;

use crate::application::ports::realtime_port::{Notification, RealtimePort};

pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out hub behind the `/socket` endpoint. Built once at startup and kept
/// alive for the lifetime of the process.
#[derive(Clone)]
pub struct RealtimeChannel {
    sender: broadcast::Sender<Notification>,
}

impl RealtimeChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn connected(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl RealtimePort for RealtimeChannel {
    fn broadcast(&self, notification: Notification) -> usize {
        // No connected sockets is harmless.
        self.sender.send(notification).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_without_listeners_is_noop() {
        let channel = RealtimeChannel::new(4);
        let sent = channel.broadcast(Notification {
            event: "orderPlaced".into(),
            payload: serde_json::Value::Null,
        });
        assert_eq!(sent, 0);
        assert_eq!(channel.connected(), 0);
    }
}
