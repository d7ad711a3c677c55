pub mod donor_repo;
pub mod foodbank_repo;
pub mod recipient_repo;
pub mod schema;
pub mod session_repo;
pub mod user_repo;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Opens the pool with foreign keys on (cascading profile deletes depend on it).
///
/// An in-memory database lives only as long as its connection, so those URLs
/// get a single connection that is never recycled.
pub async fn connect(database_url: &str) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    pool_options.connect_with(options).await
}

/// True when `err` is SQLite's unique-constraint failure on `users.email`.
pub fn is_duplicate_email(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation() && db.message().contains("users.email"))
        .unwrap_or(false)
}
