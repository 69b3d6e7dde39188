pub mod create_book;
pub mod get_book;
pub mod list_books;
