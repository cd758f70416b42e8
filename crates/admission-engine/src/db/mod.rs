//! Postgres access to the historical reference tables.

mod keepalive;
mod postgres;

pub use keepalive::spawn_keepalive;
pub use postgres::PgReferenceData;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Build the shared pool. Connections are opened lazily so the service can
/// start (and report not-ready) while the database is still coming up.
pub fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let max_connections = config.max_connections();
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(config.pool_size.min(max_connections))
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .test_before_acquire(true)
        .connect_lazy(&config.url)?;
    Ok(pool)
}
