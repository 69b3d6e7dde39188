use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::Book;

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn list_books(&self) -> anyhow::Result<Vec<Book>>;
    async fn get_book(&self, id: Uuid) -> anyhow::Result<Option<Book>>;
    async fn create_book(&self, title: &str, author: &str, price_cents: i64)
    -> anyhow::Result<Book>;
}
