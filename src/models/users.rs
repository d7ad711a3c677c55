use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Role discriminator stored in `users.user_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    Donor,
    Foodbank,
    Recipient,
    Admin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown user type: {0}")]
pub struct UnknownUserType(pub String);

impl UserType {
    pub const fn as_str(self) -> &'static str {
        match self {
            UserType::Donor => "DONOR",
            UserType::Foodbank => "FOODBANK",
            UserType::Recipient => "RECIPIENT",
            UserType::Admin => "ADMIN",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            UserType::Donor => "Donor",
            UserType::Foodbank => "Foodbank",
            UserType::Recipient => "Recipient",
            UserType::Admin => "Admin",
        }
    }

    /// Landing page after login. Roles without a dashboard return `None`.
    pub const fn dashboard_path(self) -> Option<&'static str> {
        match self {
            UserType::Donor => Some("/dashboard/donor/"),
            UserType::Foodbank => Some("/dashboard/foodbank/"),
            UserType::Recipient => Some("/dashboard/recipient/"),
            UserType::Admin => None,
        }
    }
}

impl FromStr for UserType {
    type Err = UnknownUserType;

    // Exact match only: "donor" is not a role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DONOR" => Ok(UserType::Donor),
            "FOODBANK" => Ok(UserType::Foodbank),
            "RECIPIENT" => Ok(UserType::Recipient),
            "ADMIN" => Ok(UserType::Admin),
            other => Err(UnknownUserType(other.to_string())),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl UsersRow {
    pub fn role(&self) -> Option<UserType> {
        self.user_type.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_exact_discriminators() {
        assert_eq!("DONOR".parse(), Ok(UserType::Donor));
        assert_eq!("FOODBANK".parse(), Ok(UserType::Foodbank));
        assert_eq!("RECIPIENT".parse(), Ok(UserType::Recipient));
        assert_eq!("ADMIN".parse(), Ok(UserType::Admin));
        assert!("donor".parse::<UserType>().is_err());
        assert!(" DONOR".parse::<UserType>().is_err());
        assert!("".parse::<UserType>().is_err());
    }

    #[test]
    fn admin_has_no_dashboard() {
        assert_eq!(UserType::Admin.dashboard_path(), None);
        assert_eq!(
            UserType::Foodbank.dashboard_path(),
            Some("/dashboard/foodbank/")
        );
    }

    #[test]
    fn round_trips_through_display() {
        for role in [
            UserType::Donor,
            UserType::Foodbank,
            UserType::Recipient,
            UserType::Admin,
        ] {
            assert_eq!(role.to_string().parse(), Ok(role));
        }
    }
}
