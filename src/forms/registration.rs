use serde::Deserialize;

use super::{checkbox, choice, clean_account, optional_text, required_text, FormErrors};
use crate::models::{NewDonor, NewFoodbank, NewRecipient, Profile};
use crate::services::media_service::ImageUpload;

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// A validated sign-up, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub profile: Profile,
    /// Stored before the rows are written; its path ends up on the foodbank row.
    pub picture: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DonorRegistrationForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub preferred_donor_type: String,
    pub donation_preference: String,
}

impl DonorRegistrationForm {
    pub fn clean(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();
        let account = clean_account(&mut errors, &self.email, &self.password1, &self.password2);
        let full_name = required_text(&mut errors, "full_name", &self.full_name, 255);
        let phone_number = optional_text(&mut errors, "phone_number", &self.phone_number, 20);
        let location = required_text(&mut errors, "location", &self.location, 255);
        let preferred_donor_type =
            choice(&mut errors, "preferred_donor_type", &self.preferred_donor_type);
        let donation_preference =
            choice(&mut errors, "donation_preference", &self.donation_preference);

        match (account, preferred_donor_type, donation_preference) {
            (Some((email, password)), Some(preferred_donor_type), Some(donation_preference))
                if errors.is_empty() =>
            {
                Ok(Registration {
                    email,
                    password,
                    profile: Profile::Donor(NewDonor {
                        full_name,
                        phone_number,
                        location,
                        preferred_donor_type,
                        donation_preference,
                    }),
                    picture: None,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Raw file part from the multipart body.
#[derive(Debug, Clone, Default)]
pub struct PictureField {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Filled from a multipart body, so it is built field by field rather than deserialized.
#[derive(Debug, Clone, Default)]
pub struct FoodbankRegistrationForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
    pub foodbank_name: String,
    pub phone_number: String,
    pub contact_person: String,
    pub accepts_subsistence_donations: Option<String>,
    pub picture: Option<PictureField>,
}

impl FoodbankRegistrationForm {
    /// Unknown field names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "email" => self.email = value,
            "password1" => self.password1 = value,
            "password2" => self.password2 = value,
            "foodbank_name" => self.foodbank_name = value,
            "phone_number" => self.phone_number = value,
            "contact_person" => self.contact_person = value,
            "accepts_subsistence_donations" => self.accepts_subsistence_donations = Some(value),
            _ => {}
        }
    }

    pub fn accepts_subsistence(&self) -> bool {
        checkbox(self.accepts_subsistence_donations.as_deref())
    }

    pub fn clean(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();
        let account = clean_account(&mut errors, &self.email, &self.password1, &self.password2);
        let foodbank_name = required_text(&mut errors, "foodbank_name", &self.foodbank_name, 255);
        let phone_number = required_text(&mut errors, "phone_number", &self.phone_number, 20);
        let contact_person =
            required_text(&mut errors, "contact_person", &self.contact_person, 255);

        let picture = match &self.picture {
            None => None,
            Some(field) => match ImageUpload::sniff(field.bytes.clone()) {
                Some(image) => Some(image),
                None => {
                    errors.add("picture", INVALID_IMAGE);
                    None
                }
            },
        };

        match account {
            Some((email, password)) if errors.is_empty() => Ok(Registration {
                email,
                password,
                profile: Profile::Foodbank(NewFoodbank {
                    foodbank_name,
                    phone_number,
                    contact_person,
                    picture: None,
                    accepts_subsistence_donations: self.accepts_subsistence(),
                }),
                picture,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecipientRegistrationForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
    pub full_name_or_organization: String,
    pub phone_number: String,
    pub contact_person: String,
    pub location: String,
    pub category: String,
}

impl RecipientRegistrationForm {
    pub fn clean(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();
        let account = clean_account(&mut errors, &self.email, &self.password1, &self.password2);
        let full_name_or_organization = required_text(
            &mut errors,
            "full_name_or_organization",
            &self.full_name_or_organization,
            255,
        );
        let phone_number = required_text(&mut errors, "phone_number", &self.phone_number, 20);
        let contact_person =
            required_text(&mut errors, "contact_person", &self.contact_person, 255);
        let location = required_text(&mut errors, "location", &self.location, 255);
        let category = required_text(&mut errors, "category", &self.category, 100);

        match account {
            Some((email, password)) if errors.is_empty() => Ok(Registration {
                email,
                password,
                profile: Profile::Recipient(NewRecipient {
                    full_name_or_organization,
                    phone_number,
                    contact_person,
                    location,
                    category,
                }),
                picture: None,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{PASSWORD_MISMATCH, REQUIRED};
    use crate::models::{DonationPreference, PreferredDonorType, UserType};

    fn donor_form() -> DonorRegistrationForm {
        DonorRegistrationForm {
            email: "mary@example.org".into(),
            password1: "Maize-Flour-31".into(),
            password2: "Maize-Flour-31".into(),
            full_name: "Mary Wanjiku".into(),
            phone_number: "".into(),
            location: "Kiambu".into(),
            preferred_donor_type: "FOOD".into(),
            donation_preference: "FREE".into(),
        }
    }

    #[test]
    fn donor_form_builds_donor_profile() {
        let registration = donor_form().clean().unwrap();
        assert_eq!(registration.email, "mary@example.org");
        assert_eq!(registration.profile.user_type(), UserType::Donor);
        assert_eq!(
            registration.profile,
            Profile::Donor(NewDonor {
                full_name: "Mary Wanjiku".into(),
                phone_number: None,
                location: "Kiambu".into(),
                preferred_donor_type: PreferredDonorType::Food,
                donation_preference: DonationPreference::Free,
            })
        );
    }

    #[test]
    fn donor_form_collects_every_error() {
        let form = DonorRegistrationForm {
            password2: "Maize-Flour-32".into(),
            full_name: "".into(),
            donation_preference: "LOAN".into(),
            ..donor_form()
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("password2"), [PASSWORD_MISMATCH.to_string()]);
        assert_eq!(errors.get("full_name"), [REQUIRED.to_string()]);
        assert!(errors.has("donation_preference"));
        assert!(!errors.has("location"));
    }

    #[test]
    fn foodbank_requires_phone_and_contact() {
        let mut form = FoodbankRegistrationForm::default();
        for (name, value) in [
            ("email", "bank@example.org"),
            ("password1", "Granary-Door-9"),
            ("password2", "Granary-Door-9"),
            ("foodbank_name", "Hope Pantry"),
        ] {
            form.set_field(name, value.to_string());
        }
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("phone_number"), [REQUIRED.to_string()]);
        assert_eq!(errors.get("contact_person"), [REQUIRED.to_string()]);
    }

    #[test]
    fn foodbank_checkbox_and_picture() {
        let mut form = FoodbankRegistrationForm::default();
        for (name, value) in [
            ("email", "bank@example.org"),
            ("password1", "Granary-Door-9"),
            ("password2", "Granary-Door-9"),
            ("foodbank_name", "Hope Pantry"),
            ("phone_number", "0700000000"),
            ("contact_person", "Otieno"),
            ("accepts_subsistence_donations", "on"),
        ] {
            form.set_field(name, value.to_string());
        }
        form.picture = Some(PictureField {
            file_name: "logo.png".into(),
            bytes: b"\x89PNG\r\n\x1a\nbody".to_vec(),
        });

        let registration = form.clean().unwrap();
        assert_eq!(registration.picture.as_ref().map(|p| p.extension), Some("png"));
        match registration.profile {
            Profile::Foodbank(foodbank) => {
                assert!(foodbank.accepts_subsistence_donations);
                assert_eq!(foodbank.picture, None);
            }
            other => panic!("unexpected profile {other:?}"),
        }

        form.picture = Some(PictureField {
            file_name: "notes.txt".into(),
            bytes: b"plain text".to_vec(),
        });
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("picture"), [INVALID_IMAGE.to_string()]);
    }

    #[test]
    fn recipient_category_length_is_bounded() {
        let form = RecipientRegistrationForm {
            email: "shelter@example.org".into(),
            password1: "Warm-Blanket-5".into(),
            password2: "Warm-Blanket-5".into(),
            full_name_or_organization: "Kibera Shelter".into(),
            phone_number: "0711111111".into(),
            contact_person: "Achieng".into(),
            location: "Nairobi".into(),
            category: "x".repeat(101),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.get("category"),
            ["Ensure this value has at most 100 characters (it has 101).".to_string()]
        );

        let ok = RecipientRegistrationForm {
            category: "Shelter".into(),
            ..form
        };
        assert_eq!(ok.clean().unwrap().profile.user_type(), UserType::Recipient);
    }
}
