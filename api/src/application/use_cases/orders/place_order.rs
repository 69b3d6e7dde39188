use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::event_bus::{DomainEvent, EventBus, ORDER_PLACED};
use crate::application::ports::order_repository::OrderRepository;
use crate::domain::orders::{Order, OrderItem};

pub struct PlaceOrder<'a, R, B, E>
where
    R: OrderRepository + ?Sized,
    B: BookRepository + ?Sized,
    E: EventBus + ?Sized,
{
    pub repo: &'a R,
    pub books: &'a B,
    pub events: &'a E,
}

#[derive(thiserror::Error, Debug)]
pub enum PlaceOrderError {
    #[error("an order needs at least one item")]
    Empty,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("unknown book {0}")]
    UnknownBook(Uuid),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl<'a, R, B, E> PlaceOrder<'a, R, B, E>
where
    R: OrderRepository + ?Sized,
    B: BookRepository + ?Sized,
    E: EventBus + ?Sized,
{
    /// Writes the order, then announces it on the bus. The event is only
    /// published once the write has succeeded.
    pub async fn execute(
        &self,
        user_id: Uuid,
        items: &[OrderItem],
    ) -> Result<Order, PlaceOrderError> {
        if items.is_empty() {
            return Err(PlaceOrderError::Empty);
        }
        if items.iter().any(|i| i.quantity == 0) {
            return Err(PlaceOrderError::InvalidQuantity);
        }
        for item in items {
            if self.books.get_book(item.book_id).await?.is_none() {
                return Err(PlaceOrderError::UnknownBook(item.book_id));
            }
        }

        let order = self.repo.insert_order(user_id, items).await?;

        match serde_json::to_value(&order) {
            Ok(payload) => {
                let report = self.events.publish(&DomainEvent::new(ORDER_PLACED, payload));
                tracing::debug!(order_id = %order.id, delivered = report.delivered, failed = report.failed, "order_placed_published");
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, error = ?e, "order_placed_serialize_failed");
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::ports::event_bus::EventHandler;
    use crate::infrastructure::events::InProcessEventBus;
    use crate::infrastructure::memory::{MemoryBookRepository, MemoryOrderRepository, Recorder};

    #[tokio::test]
    async fn publishes_after_write() {
        let books = MemoryBookRepository::default();
        let book = books.create_book("Dune", "Herbert", 1299).await.unwrap();
        let orders = MemoryOrderRepository::default();
        let bus = InProcessEventBus::new();
        let recorder = Arc::new(Recorder::new("recorder"));
        bus.subscribe(ORDER_PLACED, recorder.clone() as Arc<dyn EventHandler>);

        let uc = PlaceOrder {
            repo: &orders,
            books: &books,
            events: &bus,
        };
        let user = Uuid::new_v4();
        let order = uc
            .execute(
                user,
                &[OrderItem {
                    book_id: book.id,
                    quantity: 2,
                }],
            )
            .await
            .unwrap();

        let seen = recorder.events();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, ORDER_PLACED);
        assert_eq!(seen[0].payload["id"], order.id.to_string());
        assert_eq!(orders.list_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_orders_publish_nothing() {
        let books = MemoryBookRepository::default();
        let orders = MemoryOrderRepository::default();
        let bus = InProcessEventBus::new();
        let recorder = Arc::new(Recorder::new("recorder"));
        bus.subscribe(ORDER_PLACED, recorder.clone() as Arc<dyn EventHandler>);
        let uc = PlaceOrder {
            repo: &orders,
            books: &books,
            events: &bus,
        };

        let empty = uc.execute(Uuid::new_v4(), &[]).await;
        assert!(matches!(empty, Err(PlaceOrderError::Empty)));

        let missing = Uuid::new_v4();
        let unknown = uc
            .execute(
                Uuid::new_v4(),
                &[OrderItem {
                    book_id: missing,
                    quantity: 1,
                }],
            )
            .await;
        assert!(matches!(unknown, Err(PlaceOrderError::UnknownBook(id)) if id == missing));
        assert!(recorder.events().is_empty());
        assert!(orders.list_all().await.unwrap().is_empty());
    }
}
