#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipientsRow {
    pub user_id: i64,
    pub full_name_or_organization: String,
    pub phone_number: String,
    pub contact_person: String,
    pub location: String,
    pub category: String,
    pub donation_preference_status: String,
}

/// Registration never sets `donation_preference_status`; the column default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipient {
    pub full_name_or_organization: String,
    pub phone_number: String,
    pub contact_person: String,
    pub location: String,
    pub category: String,
}
