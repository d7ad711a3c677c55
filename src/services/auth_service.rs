use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;

use crate::database::user_repo;
use crate::models::UsersRow;
use crate::services::password_service::{self, PasswordHasher};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password and inactive account all look the same.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub async fn authenticate(
    pool: &SqlitePool,
    hasher: Arc<dyn PasswordHasher>,
    email: &str,
    password: &str,
) -> Result<UsersRow, AuthError> {
    let Some(user) = user_repo::load_user_by_email(pool, email).await? else {
        if let Err(e) =
            password_service::verify_absent_password(hasher, password.to_string()).await
        {
            warn!("absent-account password check failed: {}", e);
        }
        return Err(AuthError::InvalidCredentials);
    };

    let verified =
        password_service::verify_password(hasher, password.to_string(), user.password_hash.clone())
            .await;
    let matches = match verified {
        Ok(matches) => matches,
        Err(e) => {
            // Unusable passwords ("!...") land here as well.
            warn!("stored password for user {} not verifiable: {}", user.id, e);
            false
        }
    };

    if !matches || !user.is_active {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::database::{self, schema};
    use crate::services::password_service::PasswordHashError;

    /// Stores `plain:<password>` and counts every check it is asked to do.
    #[derive(Default)]
    struct CountingHasher {
        checks: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(hash == format!("plain:{password}"))
        }

        fn verify_absent(&self, _password: &str) -> Result<(), PasswordHashError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn pool_with_donor() -> SqlitePool {
        let pool = database::connect("sqlite::memory:").await.unwrap();
        schema::migrate(&pool).await.unwrap();
        user_repo::insert_user(
            &pool,
            user_repo::NewUserRow {
                email: "donor@example.org",
                password_hash: "plain:Right-Password-1",
                user_type: "DONOR",
                is_staff: false,
                is_superuser: false,
                date_joined: Utc::now(),
            },
        )
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_password_check() {
        let pool = pool_with_donor().await;
        let hasher = Arc::new(CountingHasher::default());

        let result = authenticate(&pool, hasher.clone(), "nobody@example.org", "guess").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(hasher.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wrong_password_costs_the_same_single_check() {
        let pool = pool_with_donor().await;
        let hasher = Arc::new(CountingHasher::default());

        let result = authenticate(&pool, hasher.clone(), "donor@example.org", "guess").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(hasher.checks.load(Ordering::SeqCst), 1);

        let user = authenticate(&pool, hasher.clone(), "donor@example.org", "Right-Password-1")
            .await
            .unwrap();
        assert_eq!(user.email, "donor@example.org");
    }
}
