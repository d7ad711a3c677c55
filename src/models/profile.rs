//! One user, exactly one role payload.
//!
//! A new account's discriminator is derived from its [`Profile`] variant, so a
//! donor payload can never be written under a FOODBANK user. The schema
//! triggers enforce the same rule for anything that bypasses these types.

use super::donors::{DonorsRow, NewDonor};
use super::foodbanks::{FoodbanksRow, NewFoodbank};
use super::recipients::{NewRecipient, RecipientsRow};
use super::users::UserType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    Donor(NewDonor),
    Foodbank(NewFoodbank),
    Recipient(NewRecipient),
}

impl Profile {
    pub const fn user_type(&self) -> UserType {
        match self {
            Profile::Donor(_) => UserType::Donor,
            Profile::Foodbank(_) => UserType::Foodbank,
            Profile::Recipient(_) => UserType::Recipient,
        }
    }
}

/// A profile row as loaded from its table.
#[derive(Debug, Clone)]
pub enum UserProfile {
    Donor(DonorsRow),
    Foodbank(FoodbanksRow),
    Recipient(RecipientsRow),
}
