use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::{CreateUserError, UserRepository, UserRow};
use crate::domain::users::Role;
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(r: &PgRow, with_hash: bool) -> UserRow {
    let role: String = r.get("role");
    UserRow {
        id: r.get("id"),
        email: r.get("email"),
        name: r.get("name"),
        role: Role::parse(&role),
        password_hash: if with_hash {
            r.try_get("password_hash").ok()
        } else {
            None
        },
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password_hash: &str,
    ) -> Result<UserRow, CreateUserError> {
        let res = sqlx::query(
            r#"INSERT INTO users (id, email, name, role, password_hash) VALUES ($1, $2, $3, $4, $5)
               RETURNING id, email, name, role"#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(role.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;
        match res {
            Ok(row) => Ok(map_row(&row, false)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CreateUserError::DuplicateEmail)
            }
            Err(e) => Err(CreateUserError::Store(e.into())),
        }
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT id, email, name, role, password_hash FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_row(&r, true)))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(r#"SELECT id, email, name, role FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_row(&r, false)))
    }

    async fn list_users(&self) -> anyhow::Result<Vec<UserRow>> {
        let rows =
            sqlx::query(r#"SELECT id, email, name, role FROM users ORDER BY created_at ASC"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(|r| map_row(r, false)).collect())
    }
}
