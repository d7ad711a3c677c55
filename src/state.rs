use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::password_service::PasswordHasher;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config, hasher: impl PasswordHasher + 'static) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            hasher: Arc::new(hasher),
        }
    }
}
