use sqlx::SqlitePool;

use crate::models::SessionsRow;

const SQL_INSERT_SESSION: &str = r#"
INSERT INTO sessions (
    session_key_hash,
    user_id,
    created_at,
    expires_at
) VALUES (?, ?, ?, ?)
"#;

pub const SQL_LOAD_SESSION: &str = r#"
SELECT
    session_key_hash,
    user_id,
    created_at,
    expires_at
FROM sessions
WHERE session_key_hash = ?1
LIMIT 1
"#;

const SQL_DELETE_SESSION: &str = r#"
DELETE FROM sessions WHERE session_key_hash = ?1
"#;

const SQL_DELETE_EXPIRED_SESSIONS: &str = r#"
DELETE FROM sessions WHERE expires_at <= ?1
"#;

pub struct NewSession<'a> {
    pub session_key_hash: &'a str,
    pub user_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
}

pub async fn insert_session(pool: &SqlitePool, session: NewSession<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_SESSION)
        .bind(session.session_key_hash)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_session(
    pool: &SqlitePool,
    session_key_hash: &str,
) -> sqlx::Result<Option<SessionsRow>> {
    sqlx::query_as::<_, SessionsRow>(SQL_LOAD_SESSION)
        .bind(session_key_hash)
        .fetch_optional(pool)
        .await
}

pub async fn delete_session(pool: &SqlitePool, session_key_hash: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION)
        .bind(session_key_hash)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_expired_sessions(pool: &SqlitePool, now: i64) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_EXPIRED_SESSIONS)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
