use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{FoodbanksRow, NewFoodbank};

const SQL_INSERT_FOODBANK: &str = r#"
INSERT INTO foodbanks (
    user_id,
    foodbank_name,
    phone_number,
    contact_person,
    picture,
    accepts_subsistence_donations
) VALUES (?, ?, ?, ?, ?, ?)
"#;

pub const SQL_LOAD_FOODBANK: &str = r#"
SELECT
    user_id,
    foodbank_name,
    phone_number,
    contact_person,
    picture,
    accepts_subsistence_donations
FROM foodbanks
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn insert_foodbank<'e, E>(
    executor: E,
    user_id: i64,
    foodbank: &NewFoodbank,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_FOODBANK)
        .bind(user_id)
        .bind(&foodbank.foodbank_name)
        .bind(&foodbank.phone_number)
        .bind(&foodbank.contact_person)
        .bind(foodbank.picture.as_deref())
        .bind(foodbank.accepts_subsistence_donations)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_foodbank(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<FoodbanksRow>> {
    sqlx::query_as::<_, FoodbanksRow>(SQL_LOAD_FOODBANK)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
