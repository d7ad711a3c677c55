use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{NewRecipient, RecipientsRow};

// donation_preference_status is left to the column default.
const SQL_INSERT_RECIPIENT: &str = r#"
INSERT INTO recipients (
    user_id,
    full_name_or_organization,
    phone_number,
    contact_person,
    location,
    category
) VALUES (?, ?, ?, ?, ?, ?)
"#;

pub const SQL_LOAD_RECIPIENT: &str = r#"
SELECT
    user_id,
    full_name_or_organization,
    phone_number,
    contact_person,
    location,
    category,
    donation_preference_status
FROM recipients
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn insert_recipient<'e, E>(
    executor: E,
    user_id: i64,
    recipient: &NewRecipient,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_RECIPIENT)
        .bind(user_id)
        .bind(&recipient.full_name_or_organization)
        .bind(&recipient.phone_number)
        .bind(&recipient.contact_person)
        .bind(&recipient.location)
        .bind(&recipient.category)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_recipient(
    pool: &SqlitePool,
    user_id: i64,
) -> sqlx::Result<Option<RecipientsRow>> {
    sqlx::query_as::<_, RecipientsRow>(SQL_LOAD_RECIPIENT)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
