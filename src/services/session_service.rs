use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::database::{session_repo, user_repo};
use crate::models::UsersRow;

/// A freshly issued session. `token` goes to the client; only its digest is stored.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Logs `user` in: new session row, `last_login` stamped.
pub async fn login(pool: &SqlitePool, user: &UsersRow, ttl: Duration) -> sqlx::Result<IssuedSession> {
    let now = Utc::now();
    let token = generate_token();
    let expires_at = now + ttl;

    session_repo::insert_session(
        pool,
        session_repo::NewSession {
            session_key_hash: &hash_token(&token),
            user_id: user.id,
            created_at: now.timestamp(),
            expires_at: expires_at.timestamp(),
        },
    )
    .await?;
    user_repo::update_last_login(pool, user.id, now).await?;

    info!("session started for user {}", user.id);
    Ok(IssuedSession { token, expires_at })
}

/// The user behind `token`, if the session exists, has not expired and the
/// account is still active. Expired rows are deleted on sight.
pub async fn resolve_session(pool: &SqlitePool, token: &str) -> sqlx::Result<Option<UsersRow>> {
    let key = hash_token(token);
    let Some(session) = session_repo::load_session(pool, &key).await? else {
        return Ok(None);
    };

    if session.expires_at <= Utc::now().timestamp() {
        debug!("session for user {} expired", session.user_id);
        session_repo::delete_session(pool, &key).await?;
        return Ok(None);
    }

    let user = user_repo::load_user_by_id(pool, session.user_id).await?;
    Ok(user.filter(|u| u.is_active))
}

/// Returns whether a session was actually removed.
pub async fn logout(pool: &SqlitePool, token: &str) -> sqlx::Result<bool> {
    let removed = session_repo::delete_session(pool, &hash_token(token)).await?;
    Ok(removed > 0)
}

pub async fn purge_expired_sessions(pool: &SqlitePool) -> sqlx::Result<u64> {
    session_repo::delete_expired_sessions(pool, Utc::now().timestamp()).await
}
