use sqlx::{Pool, Postgres};

pub type PgPool = Pool<Postgres>;

/// Builds the shared pool without opening a connection. Connectivity is
/// established and verified by the persistence bootstrap.
pub fn connect_lazy(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)?;
    Ok(pool)
}

pub mod repositories;
pub mod schema;
