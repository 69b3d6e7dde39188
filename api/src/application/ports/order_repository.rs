use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::orders::{Order, OrderItem};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Durably writes a new order in the `placed` state.
    async fn insert_order(&self, user_id: Uuid, items: &[OrderItem]) -> anyhow::Result<Order>;
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Order>>;
    async fn list_all(&self) -> anyhow::Result<Vec<Order>>;
}
