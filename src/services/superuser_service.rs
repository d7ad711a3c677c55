use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::{self, user_repo};
use crate::forms;
use crate::models::{UserType, UsersRow};
use crate::services::password_service::{
    self, unusable_password, PasswordHashError, PasswordHasher,
};

#[derive(Debug, Error)]
pub enum SuperuserError {
    #[error("{0}")]
    InvalidEmail(String),

    /// Only ADMIN accounts can be created without a role profile.
    #[error("Superuser must have user_type=ADMIN, got {0}.")]
    InvalidUserType(String),

    #[error("{}", forms::DUPLICATE_EMAIL)]
    DuplicateEmail,

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Creates an active staff superuser.
///
/// `user_type` defaults to ADMIN; an explicit value must be ADMIN. Without a
/// password the account gets an unusable one and cannot log in.
pub async fn create_superuser(
    pool: &SqlitePool,
    hasher: Arc<dyn PasswordHasher>,
    email: &str,
    password: Option<&str>,
    user_type: Option<&str>,
) -> Result<UsersRow, SuperuserError> {
    let email = forms::clean_email(email).map_err(SuperuserError::InvalidEmail)?;

    match user_type.map(str::trim) {
        None | Some("") => {}
        Some(raw) => match raw.parse::<UserType>() {
            Ok(UserType::Admin) => {}
            _ => return Err(SuperuserError::InvalidUserType(raw.to_string())),
        },
    }

    if user_repo::email_exists(pool, &email).await? {
        return Err(SuperuserError::DuplicateEmail);
    }

    let password_hash = match password {
        Some(password) => password_service::hash_password(hasher, password.to_string()).await?,
        None => unusable_password(),
    };

    let user_id = user_repo::insert_user(
        pool,
        user_repo::NewUserRow {
            email: &email,
            password_hash: &password_hash,
            user_type: UserType::Admin.as_str(),
            is_staff: true,
            is_superuser: true,
            date_joined: Utc::now(),
        },
    )
    .await
    .map_err(|e| {
        if database::is_duplicate_email(&e) {
            SuperuserError::DuplicateEmail
        } else {
            SuperuserError::Database(e)
        }
    })?;

    info!("created superuser {} ({})", user_id, email);

    user_repo::load_user_by_id(pool, user_id)
        .await?
        .ok_or(SuperuserError::Database(sqlx::Error::RowNotFound))
}
