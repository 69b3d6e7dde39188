use uuid::Uuid;

use crate::application::ports::order_repository::OrderRepository;
use crate::domain::orders::Order;

pub enum OrderScope {
    Owner(Uuid),
    All,
}

pub struct ListOrders<'a, R: OrderRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: OrderRepository + ?Sized> ListOrders<'a, R> {
    pub async fn execute(&self, scope: OrderScope) -> anyhow::Result<Vec<Order>> {
        match scope {
            OrderScope::Owner(user_id) => self.repo.list_for_user(user_id).await,
            OrderScope::All => self.repo.list_all().await,
        }
    }
}
