use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::{self, donor_repo, foodbank_repo, recipient_repo, user_repo};
use crate::forms::Registration;
use crate::models::{Profile, UsersRow};
use crate::services::media_service::{self, FOODBANK_PICTURES_DIR};
use crate::services::password_service::{self, PasswordHashError, PasswordHasher};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),

    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Creates the user and its profile row in one transaction: both exist afterwards or neither does.
///
/// An uploaded picture is written first and removed again if the rows are not committed.
pub async fn register_account(
    pool: &SqlitePool,
    hasher: Arc<dyn PasswordHasher>,
    media_root: &Path,
    registration: Registration,
) -> Result<UsersRow, RegistrationError> {
    let Registration {
        email,
        password,
        mut profile,
        picture,
    } = registration;

    if user_repo::email_exists(pool, &email).await? {
        return Err(RegistrationError::DuplicateEmail);
    }

    let password_hash = password_service::hash_password(hasher, password).await?;

    let stored_picture = match (&mut profile, picture) {
        (Profile::Foodbank(foodbank), Some(image)) => {
            let relative =
                media_service::store_image(media_root, FOODBANK_PICTURES_DIR, &image).await?;
            foodbank.picture = Some(relative.clone());
            Some(relative)
        }
        _ => None,
    };

    let result = insert_account(pool, &email, &password_hash, &profile).await;
    let user_id = match result {
        Ok(id) => id,
        Err(e) => {
            if let Some(relative) = &stored_picture {
                media_service::remove_media(media_root, relative).await;
            }
            return Err(e);
        }
    };

    info!(
        "registered {} user {} ({})",
        profile.user_type(),
        user_id,
        email
    );

    user_repo::load_user_by_id(pool, user_id)
        .await?
        .ok_or(RegistrationError::Database(sqlx::Error::RowNotFound))
}

async fn insert_account(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    profile: &Profile,
) -> Result<i64, RegistrationError> {
    let mut tx = pool.begin().await?;

    let user_id = user_repo::insert_user(
        &mut *tx,
        user_repo::NewUserRow {
            email,
            password_hash,
            user_type: profile.user_type().as_str(),
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
        },
    )
    .await
    .map_err(|e| {
        if database::is_duplicate_email(&e) {
            warn!("lost race registering {}", email);
            RegistrationError::DuplicateEmail
        } else {
            RegistrationError::Database(e)
        }
    })?;

    match profile {
        Profile::Donor(donor) => donor_repo::insert_donor(&mut *tx, user_id, donor).await?,
        Profile::Foodbank(foodbank) => {
            foodbank_repo::insert_foodbank(&mut *tx, user_id, foodbank).await?
        }
        Profile::Recipient(recipient) => {
            recipient_repo::insert_recipient(&mut *tx, user_id, recipient).await?
        }
    };

    tx.commit().await?;
    Ok(user_id)
}
