use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub event: String,
    pub payload: serde_json::Value,
}

pub trait RealtimePort: Send + Sync {
    /// Fans the notification out to connected sockets and returns how many
    /// receivers got it. Zero receivers is not an error.
    fn broadcast(&self, notification: Notification) -> usize;
}
