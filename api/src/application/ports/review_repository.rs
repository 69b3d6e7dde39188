use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::Review;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list_for_book(&self, book_id: Uuid) -> anyhow::Result<Vec<Review>>;
    async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i16,
        body: &str,
    ) -> anyhow::Result<Review>;
}
