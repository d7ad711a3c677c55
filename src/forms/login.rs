use serde::Deserialize;

use super::{clean_email, FormErrors, REQUIRED};

/// The identifier travels in the generic `username` slot but must be an email.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::default();
        let email = clean_email(&self.username)
            .map_err(|message| errors.add("username", message))
            .ok();
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        match email {
            Some(email) if errors.is_empty() => Ok(Credentials {
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}
