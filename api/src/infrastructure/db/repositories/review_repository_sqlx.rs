use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::review_repository::ReviewRepository;
use crate::domain::catalog::Review;
use crate::infrastructure::db::PgPool;

pub struct SqlxReviewRepository {
    pub pool: PgPool,
}

impl SqlxReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(r: &PgRow) -> Review {
    Review {
        id: r.get("id"),
        book_id: r.get("book_id"),
        user_id: r.get("user_id"),
        rating: r.get("rating"),
        body: r.get("body"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepository {
    async fn list_for_book(&self, book_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"SELECT id, book_id, user_id, rating, body, created_at
               FROM reviews WHERE book_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_row).collect())
    }

    async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i16,
        body: &str,
    ) -> anyhow::Result<Review> {
        let row = sqlx::query(
            r#"INSERT INTO reviews (id, book_id, user_id, rating, body) VALUES ($1, $2, $3, $4, $5)
               RETURNING id, book_id, user_id, rating, body, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_row(&row))
    }
}
