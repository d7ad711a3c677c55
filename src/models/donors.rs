use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredDonorType {
    Food,
    Funds,
    Others,
}

impl PreferredDonorType {
    pub const ALL: [PreferredDonorType; 3] = [
        PreferredDonorType::Food,
        PreferredDonorType::Funds,
        PreferredDonorType::Others,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PreferredDonorType::Food => "FOOD",
            PreferredDonorType::Funds => "FUNDS",
            PreferredDonorType::Others => "OTHERS",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PreferredDonorType::Food => "Food",
            PreferredDonorType::Funds => "Funds",
            PreferredDonorType::Others => "Others",
        }
    }
}

impl FromStr for PreferredDonorType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationPreference {
    Subsistence,
    Free,
}

impl DonationPreference {
    pub const ALL: [DonationPreference; 2] =
        [DonationPreference::Subsistence, DonationPreference::Free];

    pub const fn as_str(self) -> &'static str {
        match self {
            DonationPreference::Subsistence => "SUBSISTENCE",
            DonationPreference::Free => "FREE",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DonationPreference::Subsistence => "Subsistence",
            DonationPreference::Free => "Free",
        }
    }
}

impl FromStr for DonationPreference {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|p| p.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonorsRow {
    pub user_id: i64,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub location: String,
    pub preferred_donor_type: String,
    pub donation_preference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonor {
    pub full_name: String,
    pub phone_number: Option<String>,
    /// County/Town.
    pub location: String,
    pub preferred_donor_type: PreferredDonorType,
    pub donation_preference: DonationPreference,
}
