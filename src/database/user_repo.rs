use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::UsersRow;

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
    email,
    password_hash,
    user_type,
    is_staff,
    is_superuser,
    is_active,
    date_joined
) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
"#;

pub const SQL_LOAD_USER_BY_EMAIL: &str = r#"
SELECT
    id,
    email,
    password_hash,
    user_type,
    is_staff,
    is_superuser,
    is_active,
    date_joined,
    last_login
FROM users
WHERE email = ?1
LIMIT 1
"#;

pub const SQL_LOAD_USER_BY_ID: &str = r#"
SELECT
    id,
    email,
    password_hash,
    user_type,
    is_staff,
    is_superuser,
    is_active,
    date_joined,
    last_login
FROM users
WHERE id = ?1
LIMIT 1
"#;

const SQL_EMAIL_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)
"#;

const SQL_UPDATE_LAST_LOGIN: &str = r#"
UPDATE users SET last_login = ?2 WHERE id = ?1
"#;

const SQL_DELETE_USER: &str = r#"
DELETE FROM users WHERE id = ?1
"#;

pub struct NewUserRow<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub user_type: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

/// Returns the new user's id.
pub async fn insert_user<'e, E>(executor: E, user: NewUserRow<'_>) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_USER)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.user_type)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.date_joined)
        .execute(executor)
        .await?;
    Ok(res.last_insert_rowid())
}

// The email column is COLLATE NOCASE, so lookups ignore case.
pub async fn load_user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_BY_EMAIL)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn load_user_by_id(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_BY_ID)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> sqlx::Result<bool> {
    let exists: i64 = sqlx::query_scalar(SQL_EMAIL_EXISTS)
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(exists != 0)
}

pub async fn update_last_login(
    pool: &SqlitePool,
    user_id: i64,
    at: DateTime<Utc>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_LAST_LOGIN)
        .bind(user_id)
        .bind(at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Profile and session rows go with it (`ON DELETE CASCADE`).
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_USER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
