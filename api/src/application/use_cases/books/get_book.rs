use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::domain::catalog::Book;

pub struct GetBook<'a, R: BookRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BookRepository + ?Sized> GetBook<'a, R> {
    pub async fn execute(&self, id: Uuid) -> anyhow::Result<Option<Book>> {
        self.repo.get_book(id).await
    }
}
