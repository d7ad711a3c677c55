use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{DonorsRow, NewDonor};

const SQL_INSERT_DONOR: &str = r#"
INSERT INTO donors (
    user_id,
    full_name,
    phone_number,
    location,
    preferred_donor_type,
    donation_preference
) VALUES (?, ?, ?, ?, ?, ?)
"#;

pub const SQL_LOAD_DONOR: &str = r#"
SELECT
    user_id,
    full_name,
    phone_number,
    location,
    preferred_donor_type,
    donation_preference
FROM donors
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn insert_donor<'e, E>(executor: E, user_id: i64, donor: &NewDonor) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_DONOR)
        .bind(user_id)
        .bind(&donor.full_name)
        .bind(donor.phone_number.as_deref())
        .bind(&donor.location)
        .bind(donor.preferred_donor_type.as_str())
        .bind(donor.donation_preference.as_str())
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_donor(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<DonorsRow>> {
    sqlx::query_as::<_, DonorsRow>(SQL_LOAD_DONOR)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
