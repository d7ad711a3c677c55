pub mod donors;
pub mod foodbanks;
pub mod profile;
pub mod recipients;
pub mod sessions;
pub mod users;

pub use donors::{DonationPreference, DonorsRow, NewDonor, PreferredDonorType};
pub use foodbanks::{FoodbanksRow, NewFoodbank};
pub use profile::{Profile, UserProfile};
pub use recipients::{NewRecipient, RecipientsRow};
pub use sessions::SessionsRow;
pub use users::{UserType, UsersRow};
