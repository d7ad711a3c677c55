#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionsRow {
    pub session_key_hash: String,
    pub user_id: i64,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub expires_at: i64,
}
