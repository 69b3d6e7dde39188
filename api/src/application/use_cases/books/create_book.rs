use crate::application::ports::book_repository::BookRepository;
use crate::domain::catalog::Book;

pub struct CreateBook<'a, R: BookRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub price_cents: i64,
}

#[derive(thiserror::Error, Debug)]
pub enum CreateBookError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl<'a, R: BookRepository + ?Sized> CreateBook<'a, R> {
    pub async fn execute(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let title = req.title.trim();
        let author = req.author.trim();
        if title.is_empty() {
            return Err(CreateBookError::Invalid("title is required"));
        }
        if author.is_empty() {
            return Err(CreateBookError::Invalid("author is required"));
        }
        if req.price_cents < 0 {
            return Err(CreateBookError::Invalid("price must not be negative"));
        }
        Ok(self.repo.create_book(title, author, req.price_cents).await?)
    }
}
