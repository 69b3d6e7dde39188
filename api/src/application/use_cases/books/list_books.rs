use crate::application::ports::book_repository::BookRepository;
use crate::domain::catalog::Book;

pub struct ListBooks<'a, R: BookRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BookRepository + ?Sized> ListBooks<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Book>> {
        self.repo.list_books().await
    }
}
