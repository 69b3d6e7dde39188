use anyhow::Context;
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::application::ports::order_repository::OrderRepository;
use crate::domain::orders::{Order, OrderItem, OrderStatus};
use crate::infrastructure::db::PgPool;

pub struct SqlxOrderRepository {
    pub pool: PgPool,
}

impl SqlxOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(r: &PgRow) -> anyhow::Result<Order> {
    let items: Json<Vec<OrderItem>> = r.try_get("items").context("order_items_decode")?;
    let status: String = r.get("status");
    Ok(Order {
        id: r.get("id"),
        user_id: r.get("user_id"),
        items: items.0,
        status: OrderStatus::parse(&status),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl OrderRepository for SqlxOrderRepository {
    async fn insert_order(&self, user_id: Uuid, items: &[OrderItem]) -> anyhow::Result<Order> {
        let row = sqlx::query(
            r#"INSERT INTO orders (id, user_id, items, status) VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, items, status, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(items))
        .bind(OrderStatus::Placed.as_str())
        .fetch_one(&self.pool)
        .await?;
        map_row(&row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, items, status, created_at
               FROM orders WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row).collect()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, items, status, created_at FROM orders ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row).collect()
    }
}
