use sqlx::SqlitePool;
use tracing::info;

const SQL_CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK (length(email) <= 254),
    password_hash TEXT NOT NULL,
    user_type TEXT NOT NULL CHECK (user_type IN ('DONOR', 'FOODBANK', 'RECIPIENT', 'ADMIN')),
    is_staff BOOLEAN NOT NULL DEFAULT 0,
    is_superuser BOOLEAN NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    date_joined DATETIME NOT NULL,
    last_login DATETIME
)
"#;

const SQL_LOCK_USER_TYPE: &str = r#"
CREATE TRIGGER IF NOT EXISTS users_user_type_immutable
BEFORE UPDATE OF user_type ON users
WHEN NEW.user_type IS NOT OLD.user_type
BEGIN
    SELECT RAISE(ABORT, 'user_type cannot change after creation');
END
"#;

const SQL_CREATE_DONORS: &str = r#"
CREATE TABLE IF NOT EXISTS donors (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    full_name TEXT NOT NULL CHECK (length(full_name) <= 255),
    phone_number TEXT CHECK (phone_number IS NULL OR length(phone_number) <= 20),
    location TEXT NOT NULL CHECK (length(location) <= 255),
    preferred_donor_type TEXT NOT NULL CHECK (preferred_donor_type IN ('FOOD', 'FUNDS', 'OTHERS')),
    donation_preference TEXT NOT NULL CHECK (donation_preference IN ('SUBSISTENCE', 'FREE'))
)
"#;

const SQL_DONORS_REQUIRE_DONOR: &str = r#"
CREATE TRIGGER IF NOT EXISTS donors_require_donor_user
BEFORE INSERT ON donors
WHEN (SELECT user_type FROM users WHERE id = NEW.user_id) IS NOT 'DONOR'
BEGIN
    SELECT RAISE(ABORT, 'donor profile requires a DONOR user');
END
"#;

const SQL_CREATE_FOODBANKS: &str = r#"
CREATE TABLE IF NOT EXISTS foodbanks (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    foodbank_name TEXT NOT NULL CHECK (length(foodbank_name) <= 255),
    phone_number TEXT NOT NULL CHECK (length(phone_number) <= 20),
    contact_person TEXT NOT NULL CHECK (length(contact_person) <= 255),
    picture TEXT,
    accepts_subsistence_donations BOOLEAN NOT NULL
)
"#;

const SQL_FOODBANKS_REQUIRE_FOODBANK: &str = r#"
CREATE TRIGGER IF NOT EXISTS foodbanks_require_foodbank_user
BEFORE INSERT ON foodbanks
WHEN (SELECT user_type FROM users WHERE id = NEW.user_id) IS NOT 'FOODBANK'
BEGIN
    SELECT RAISE(ABORT, 'foodbank profile requires a FOODBANK user');
END
"#;

const SQL_CREATE_RECIPIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS recipients (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    full_name_or_organization TEXT NOT NULL CHECK (length(full_name_or_organization) <= 255),
    phone_number TEXT NOT NULL CHECK (length(phone_number) <= 20),
    contact_person TEXT NOT NULL CHECK (length(contact_person) <= 255),
    location TEXT NOT NULL CHECK (length(location) <= 255),
    category TEXT NOT NULL CHECK (length(category) <= 100),
    donation_preference_status TEXT NOT NULL DEFAULT 'Pending Foodbank Assessment'
        CHECK (length(donation_preference_status) <= 100)
)
"#;

const SQL_RECIPIENTS_REQUIRE_RECIPIENT: &str = r#"
CREATE TRIGGER IF NOT EXISTS recipients_require_recipient_user
BEFORE INSERT ON recipients
WHEN (SELECT user_type FROM users WHERE id = NEW.user_id) IS NOT 'RECIPIENT'
BEGIN
    SELECT RAISE(ABORT, 'recipient profile requires a RECIPIENT user');
END
"#;

const SQL_CREATE_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    session_key_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
)
"#;

const SQL_INDEX_SESSIONS_EXPIRES_AT: &str = r#"
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)
"#;

const MIGRATIONS: &[&str] = &[
    SQL_CREATE_USERS,
    SQL_LOCK_USER_TYPE,
    SQL_CREATE_DONORS,
    SQL_DONORS_REQUIRE_DONOR,
    SQL_CREATE_FOODBANKS,
    SQL_FOODBANKS_REQUIRE_FOODBANK,
    SQL_CREATE_RECIPIENTS,
    SQL_RECIPIENTS_REQUIRE_RECIPIENT,
    SQL_CREATE_SESSIONS,
    SQL_INDEX_SESSIONS_EXPIRES_AT,
];

/// Applies the schema. Every statement is idempotent, so this runs on each start.
pub async fn migrate(pool: &SqlitePool) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("schema ready ({} statements)", MIGRATIONS.len());
    Ok(())
}
