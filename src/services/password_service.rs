use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::{Arc, OnceLock};

use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

/// Turns plaintext passwords into stored hashes and checks them back.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a parseable hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;

    /// Does the work of a `verify` for a login with no account behind it, so
    /// unknown emails take as long as wrong passwords.
    fn verify_absent(&self, password: &str) -> Result<(), PasswordHashError>;
}

const ABSENT_ACCOUNT_PASSWORD: &str = "no account has this password";

/// Argon2id with a random 16-byte salt per password.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    absent_hash: OnceLock<String>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            absent_hash: OnceLock::new(),
        }
    }

    /// Custom cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordHashError(e.to_string()))?;
        Ok(Self {
            params,
            absent_hash: OnceLock::new(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordHashError(e.to_string()))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordHashError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordHashError(e.to_string()))?;

        // Cost parameters are read from the hash itself.
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn verify_absent(&self, password: &str) -> Result<(), PasswordHashError> {
        let hash = match self.absent_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash(ABSENT_ACCOUNT_PASSWORD)?;
                self.absent_hash.get_or_init(|| hash)
            }
        };
        self.verify(password, hash).map(|_| ())
    }
}

/// Runs `op` on the blocking pool. Argon2 takes tens of milliseconds and
/// must not hold an async worker.
async fn off_runtime<T, F>(hasher: Arc<dyn PasswordHasher>, op: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce(&dyn PasswordHasher) -> Result<T, PasswordHashError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(hasher.as_ref()))
        .await
        .map_err(|e| PasswordHashError(format!("hashing task failed: {e}")))?
}

pub async fn hash_password(
    hasher: Arc<dyn PasswordHasher>,
    password: String,
) -> Result<String, PasswordHashError> {
    off_runtime(hasher, move |h| h.hash(&password)).await
}

pub async fn verify_password(
    hasher: Arc<dyn PasswordHasher>,
    password: String,
    hash: String,
) -> Result<bool, PasswordHashError> {
    off_runtime(hasher, move |h| h.verify(&password, &hash)).await
}

pub async fn verify_absent_password(
    hasher: Arc<dyn PasswordHasher>,
    password: String,
) -> Result<(), PasswordHashError> {
    off_runtime(hasher, move |h| h.verify_absent(&password)).await
}

/// A stored value that can never verify, for accounts created without a password.
pub fn unusable_password() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let suffix: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("!{suffix}")
}
