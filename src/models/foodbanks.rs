#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodbanksRow {
    pub user_id: i64,
    pub foodbank_name: String,
    pub phone_number: String,
    pub contact_person: String,
    /// Path relative to the media root, e.g. `foodbank_pictures/<id>.png`.
    pub picture: Option<String>,
    pub accepts_subsistence_donations: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFoodbank {
    pub foodbank_name: String,
    pub phone_number: String,
    pub contact_person: String,
    pub picture: Option<String>,
    pub accepts_subsistence_donations: bool,
}
