use sqlx::SqlitePool;

use crate::database::{donor_repo, foodbank_repo, recipient_repo};
use crate::models::{
    DonationPreference, PreferredDonorType, UserProfile, UserType, UsersRow,
};

pub struct ProfileDetail {
    pub label: &'static str,
    pub value: String,
}

pub struct DashboardView {
    pub email: String,
    pub role_label: String,
    pub date_joined: String,
    pub last_login: String,
    /// Empty when the profile row is missing.
    pub details: Vec<ProfileDetail>,
    /// Media URL of the foodbank picture, empty when there is none.
    pub picture_url: String,
}

pub async fn load_profile(pool: &SqlitePool, user: &UsersRow) -> sqlx::Result<Option<UserProfile>> {
    let profile = match user.role() {
        Some(UserType::Donor) => donor_repo::load_donor(pool, user.id)
            .await?
            .map(UserProfile::Donor),
        Some(UserType::Foodbank) => foodbank_repo::load_foodbank(pool, user.id)
            .await?
            .map(UserProfile::Foodbank),
        Some(UserType::Recipient) => recipient_repo::load_recipient(pool, user.id)
            .await?
            .map(UserProfile::Recipient),
        Some(UserType::Admin) | None => None,
    };
    Ok(profile)
}

pub async fn load_dashboard_view(pool: &SqlitePool, user: &UsersRow) -> sqlx::Result<DashboardView> {
    let profile = load_profile(pool, user).await?;

    let picture_url = match &profile {
        Some(UserProfile::Foodbank(row)) => row
            .picture
            .as_deref()
            .map(|p| format!("/media/{}", p))
            .unwrap_or_default(),
        _ => String::new(),
    };

    Ok(DashboardView {
        email: user.email.clone(),
        role_label: user
            .role()
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| user.user_type.clone()),
        date_joined: user.date_joined.format("%Y-%m-%d %H:%M").to_string(),
        last_login: user
            .last_login
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string()),
        details: profile.map(profile_details).unwrap_or_default(),
        picture_url,
    })
}

fn profile_details(profile: UserProfile) -> Vec<ProfileDetail> {
    let detail = |label, value: String| ProfileDetail { label, value };
    match profile {
        UserProfile::Donor(row) => vec![
            detail("Full name", row.full_name),
            detail("Phone number", row.phone_number.unwrap_or_default()),
            detail("Location", row.location),
            detail(
                "Preferred donation type",
                choice_label(&row.preferred_donor_type, PreferredDonorType::label),
            ),
            detail(
                "Donation preference",
                choice_label(&row.donation_preference, DonationPreference::label),
            ),
        ],
        UserProfile::Foodbank(row) => vec![
            detail("Foodbank name", row.foodbank_name),
            detail("Phone number", row.phone_number),
            detail("Contact person", row.contact_person),
            detail(
                "Accepts subsistence donations",
                if row.accepts_subsistence_donations { "Yes" } else { "No" }.to_string(),
            ),
        ],
        UserProfile::Recipient(row) => vec![
            detail("Name / organization", row.full_name_or_organization),
            detail("Phone number", row.phone_number),
            detail("Contact person", row.contact_person),
            detail("Location", row.location),
            detail("Category", row.category),
            detail("Donation preference status", row.donation_preference_status),
        ],
    }
}

fn choice_label<T: std::str::FromStr>(raw: &str, label: fn(T) -> &'static str) -> String {
    raw.parse::<T>()
        .map(|choice| label(choice).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_labels_fall_back_to_raw_value() {
        assert_eq!(choice_label("FUNDS", PreferredDonorType::label), "Funds");
        assert_eq!(choice_label("SUBSISTENCE", DonationPreference::label), "Subsistence");
        assert_eq!(choice_label("BARTER", DonationPreference::label), "BARTER");
    }
}
