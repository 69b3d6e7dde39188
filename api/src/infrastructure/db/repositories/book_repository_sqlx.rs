use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::domain::catalog::Book;
use crate::infrastructure::db::PgPool;

pub struct SqlxBookRepository {
    pub pool: PgPool,
}

impl SqlxBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(r: &PgRow) -> Book {
    Book {
        id: r.get("id"),
        title: r.get("title"),
        author: r.get("author"),
        price_cents: r.get("price_cents"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl BookRepository for SqlxBookRepository {
    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"SELECT id, title, author, price_cents, created_at FROM books ORDER BY title ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_row).collect())
    }

    async fn get_book(&self, id: Uuid) -> anyhow::Result<Option<Book>> {
        let row = sqlx::query(
            r#"SELECT id, title, author, price_cents, created_at FROM books WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_row))
    }

    async fn create_book(
        &self,
        title: &str,
        author: &str,
        price_cents: i64,
    ) -> anyhow::Result<Book> {
        let row = sqlx::query(
            r#"INSERT INTO books (id, title, author, price_cents) VALUES ($1, $2, $3, $4)
               RETURNING id, title, author, price_cents, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(author)
        .bind(price_cents)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_row(&row))
    }
}
