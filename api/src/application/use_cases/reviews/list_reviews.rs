use uuid::Uuid;

use crate::application::ports::review_repository::ReviewRepository;
use crate::domain::catalog::Review;

pub struct ListReviews<'a, R: ReviewRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ReviewRepository + ?Sized> ListReviews<'a, R> {
    pub async fn execute(&self, book_id: Uuid) -> anyhow::Result<Vec<Review>> {
        self.repo.list_for_book(book_id).await
    }
}
