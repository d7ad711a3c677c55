use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use rand::RngCore;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Uploaded files live here and are served under `/media/`.
    pub media_root: PathBuf,
    pub session_ttl: chrono::Duration,
    pub session_cookie_secure: bool,
    pub session_purge_interval: Duration,
    pub max_upload_bytes: usize,
    /// Signs the `messages` cookie.
    pub secret_key: String,
    /// Origins besides the request's own host allowed to submit forms.
    pub csrf_trusted_origins: Vec<String>,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://foodbank.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_MEDIA_ROOT: &str = "media";
// Two weeks.
const DEFAULT_SESSION_TTL_HOURS: &str = "336";
const DEFAULT_SESSION_COOKIE_SECURE: &str = "false";
const DEFAULT_SESSION_PURGE_INTERVAL_SECS: &str = "3600";
const DEFAULT_MAX_UPLOAD_BYTES: &str = "5242880";

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let session_ttl_hours: i64 = try_load("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let purge_secs: u64 = try_load(
            "SESSION_PURGE_INTERVAL_SECS",
            DEFAULT_SESSION_PURGE_INTERVAL_SECS,
        )?;

        if session_ttl_hours <= 0 {
            return Err(ConfigError {
                key: "SESSION_TTL_HOURS",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            database_url: try_load("DATABASE_URL", DEFAULT_DATABASE_URL)?,
            host: try_load("HOST", DEFAULT_HOST)?,
            port: try_load("PORT", DEFAULT_PORT)?,
            media_root: try_load("MEDIA_ROOT", DEFAULT_MEDIA_ROOT)?,
            session_ttl: chrono::Duration::hours(session_ttl_hours),
            session_cookie_secure: try_load(
                "SESSION_COOKIE_SECURE",
                DEFAULT_SESSION_COOKIE_SECURE,
            )?,
            session_purge_interval: Duration::from_secs(purge_secs.max(1)),
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            secret_key: load_secret_key(),
            csrf_trusted_origins: var("CSRF_TRUSTED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: 3000,
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            session_ttl: chrono::Duration::hours(336),
            session_cookie_secure: false,
            session_purge_interval: Duration::from_secs(3600),
            max_upload_bytes: 5 * 1024 * 1024,
            secret_key: random_secret(),
            csrf_trusted_origins: Vec::new(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_secret_key() -> String {
    match var("SECRET_KEY").filter(|key| !key.trim().is_empty()) {
        Some(key) => key,
        None => {
            warn!("SECRET_KEY not set, using a random key; pending messages will not survive a restart");
            random_secret()
        }
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Comma-separated `scheme://host[:port]` entries, without trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            reason: e.to_string(),
        }
    })
}
