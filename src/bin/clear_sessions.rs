//! Deletes expired sessions; meant for cron.

use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use foodbank::database::{self, schema};
use foodbank::services::session_service;
use foodbank::Config;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    match run(&config).await {
        Ok(removed) => info!("cleared {} expired sessions", removed),
        Err(e) => {
            error!("clearing sessions failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(config: &Config) -> Result<u64, Box<dyn std::error::Error>> {
    let pool = database::connect(&config.database_url).await?;
    schema::migrate(&pool).await?;
    Ok(session_service::purge_expired_sessions(&pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_only_expired_sessions_from_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: format!("sqlite://{}", dir.path().join("sessions.db").display()),
            ..Config::default()
        };

        let pool = database::connect(&config.database_url).await.unwrap();
        schema::migrate(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO users (email, password_hash, user_type, date_joined)
             VALUES ('donor@example.org', '!', 'DONOR', '2024-01-01 00:00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let now = chrono::Utc::now().timestamp();
        for (key, expires_at) in [("stale", now - 60), ("live", now + 3600)] {
            sqlx::query(
                "INSERT INTO sessions (session_key_hash, user_id, created_at, expires_at)
                 VALUES (?, 1, ?, ?)",
            )
            .bind(key)
            .bind(now - 120)
            .bind(expires_at)
            .execute(&pool)
            .await
            .unwrap();
        }

        assert_eq!(run(&config).await.unwrap(), 1);

        let left: Vec<String> = sqlx::query_scalar("SELECT session_key_hash FROM sessions")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(left, vec!["live".to_string()]);
    }
}
