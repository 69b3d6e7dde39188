use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::domain::catalog::Review;

pub struct CreateReview<'a, R, B>
where
    R: ReviewRepository + ?Sized,
    B: BookRepository + ?Sized,
{
    pub repo: &'a R,
    pub books: &'a B,
}

#[derive(Debug, Clone)]
pub struct CreateReviewRequest {
    pub book_id: Uuid,
    pub rating: i16,
    pub body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum CreateReviewError {
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error("book not found")]
    UnknownBook,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl<'a, R, B> CreateReview<'a, R, B>
where
    R: ReviewRepository + ?Sized,
    B: BookRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        req: &CreateReviewRequest,
    ) -> Result<Review, CreateReviewError> {
        if !(1..=5).contains(&req.rating) {
            return Err(CreateReviewError::InvalidRating);
        }
        if self.books.get_book(req.book_id).await?.is_none() {
            return Err(CreateReviewError::UnknownBook);
        }
        Ok(self
            .repo
            .create_review(req.book_id, user_id, req.rating, req.body.trim())
            .await?)
    }
}
