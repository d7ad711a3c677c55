//! Request-body validation.
//!
//! Each form cleans its raw string fields into typed values or collects
//! per-field messages in [`FormErrors`] for the page to re-render.

pub mod login;
pub mod registration;

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

pub use login::{Credentials, LoginForm};
pub use registration::{
    DonorRegistrationForm, FoodbankRegistrationForm, PictureField, RecipientRegistrationForm,
    Registration,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const DUPLICATE_EMAIL: &str = "User with this Email already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
pub const PASSWORD_NUMERIC: &str = "This password is entirely numeric.";
pub const PASSWORD_TOO_SIMILAR: &str = "The password is too similar to the email address.";

const EMAIL_MAX_LENGTH: usize = 254;
const PASSWORD_MIN_LENGTH: usize = 8;
const MAX_SIMILARITY: f64 = 0.7;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("separator pattern compiles"));

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Trims the address and lowercases its domain part.
pub fn normalize_email(raw: &str) -> String {
    let email = raw.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Normalized email or the message to show for it.
pub fn clean_email(raw: &str) -> Result<String, String> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let length = email.chars().count();
    if length > EMAIL_MAX_LENGTH {
        return Err(max_length_message(EMAIL_MAX_LENGTH, length));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(INVALID_EMAIL.to_string());
    }
    Ok(email)
}

fn max_length_message(max: usize, actual: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {actual}).")
}

pub(crate) fn required_text(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    max_length: usize,
) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return String::new();
    }
    check_length(errors, field, value, max_length);
    value.to_string()
}

/// Blank input becomes `None`.
pub(crate) fn optional_text(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    max_length: usize,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    check_length(errors, field, value, max_length);
    Some(value.to_string())
}

fn check_length(errors: &mut FormErrors, field: &'static str, value: &str, max_length: usize) {
    let length = value.chars().count();
    if length > max_length {
        errors.add(field, max_length_message(max_length, length));
    }
}

pub(crate) fn choice<T: FromStr>(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<T> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(
                field,
                format!("Select a valid choice. {value} is not one of the available choices."),
            );
            None
        }
    }
}

/// HTML checkbox semantics: absent or unchecked is false.
pub(crate) fn checkbox(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1")
    )
}

/// Email plus the confirmed password, with every failure recorded in `errors`.
pub(crate) fn clean_account(
    errors: &mut FormErrors,
    raw_email: &str,
    password1: &str,
    password2: &str,
) -> Option<(String, String)> {
    let email = match clean_email(raw_email) {
        Ok(email) => Some(email),
        Err(message) => {
            errors.add("email", message);
            None
        }
    };

    if password1.is_empty() {
        errors.add("password1", REQUIRED);
    }
    if password2.is_empty() {
        errors.add("password2", REQUIRED);
    }
    if password1.is_empty() || password2.is_empty() {
        return None;
    }
    if password1 != password2 {
        errors.add("password2", PASSWORD_MISMATCH);
        return None;
    }

    let problems = password_problems(password1, email.as_deref().unwrap_or(raw_email));
    if !problems.is_empty() {
        for problem in problems {
            errors.add("password2", problem);
        }
        return None;
    }

    email.map(|email| (email, password1.to_string()))
}

fn password_problems(password: &str, email: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if is_too_similar(password, email) {
        problems.push(PASSWORD_TOO_SIMILAR);
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(PASSWORD_TOO_SHORT);
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push(PASSWORD_NUMERIC);
    }
    problems
}

fn is_too_similar(password: &str, email: &str) -> bool {
    let password = password.to_lowercase();
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return false;
    }

    NON_WORD_RE
        .split(&email)
        .chain(std::iter::once(email.as_str()))
        .filter(|part| !exceeds_length_ratio(&password, part))
        .any(|part| quick_ratio(&password, part) >= MAX_SIMILARITY)
}

/// A password far longer than `part` cannot be meaningfully similar to it.
fn exceeds_length_ratio(password: &str, part: &str) -> bool {
    let password_len = password.chars().count();
    let part_len = part.chars().count();
    password_len >= 10 * part_len && (part_len as f64) < MAX_SIMILARITY / 2.0 * password_len as f64
}

/// 2·M / (|a| + |b|) where M counts characters the two strings share,
/// ignoring order. An upper bound on the sequence-matching ratio.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let mut matches = 0usize;
    for c in a.chars() {
        if let Some(n) = available.get_mut(&c) {
            if *n > 0 {
                *n -= 1;
                matches += 1;
            }
        }
    }
    (2 * matches) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_domain_only() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "Jane.Doe@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn email_validation() {
        assert_eq!(clean_email("donor@example.org").as_deref(), Ok("donor@example.org"));
        assert_eq!(clean_email("").unwrap_err(), REQUIRED);
        assert_eq!(clean_email("not-an-email").unwrap_err(), INVALID_EMAIL);
        assert_eq!(clean_email("a@b").unwrap_err(), INVALID_EMAIL);
        assert_eq!(clean_email("a..b@example.org").unwrap_err(), INVALID_EMAIL);

        let long = format!("{}@example.org", "a".repeat(250));
        assert!(clean_email(&long).unwrap_err().starts_with("Ensure this value has at most 254"));
    }

    #[test]
    fn required_and_optional_text() {
        let mut errors = FormErrors::default();
        assert_eq!(required_text(&mut errors, "name", "  Ann  ", 255), "Ann");
        assert!(errors.is_empty());

        required_text(&mut errors, "location", "   ", 255);
        assert_eq!(errors.get("location"), [REQUIRED.to_string()]);

        assert_eq!(optional_text(&mut errors, "phone_number", "  ", 20), None);
        assert!(!errors.has("phone_number"));

        optional_text(&mut errors, "phone_number", &"1".repeat(21), 20);
        assert_eq!(
            errors.get("phone_number"),
            ["Ensure this value has at most 20 characters (it has 21).".to_string()]
        );
    }

    #[test]
    fn choice_rejects_unknown_values() {
        use crate::models::PreferredDonorType;

        let mut errors = FormErrors::default();
        let parsed: Option<PreferredDonorType> = choice(&mut errors, "preferred_donor_type", "FUNDS");
        assert_eq!(parsed, Some(PreferredDonorType::Funds));

        let parsed: Option<PreferredDonorType> = choice(&mut errors, "preferred_donor_type", "CASH");
        assert_eq!(parsed, None);
        assert_eq!(
            errors.get("preferred_donor_type"),
            ["Select a valid choice. CASH is not one of the available choices.".to_string()]
        );
    }

    #[test]
    fn checkbox_values() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(checkbox(Some("1")));
        assert!(!checkbox(Some("")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(None));
    }

    #[test]
    fn account_requires_matching_passwords() {
        let mut errors = FormErrors::default();
        let account = clean_account(&mut errors, "a@example.org", "Harvest-2024", "Harvest-2025");
        assert_eq!(account, None);
        assert_eq!(errors.get("password2"), [PASSWORD_MISMATCH.to_string()]);
    }

    #[test]
    fn account_rejects_weak_passwords() {
        let mut errors = FormErrors::default();
        assert_eq!(clean_account(&mut errors, "a@example.org", "1234", "1234"), None);
        let messages = errors.get("password2");
        assert!(messages.contains(&PASSWORD_TOO_SHORT.to_string()));
        assert!(messages.contains(&PASSWORD_NUMERIC.to_string()));
    }

    #[test]
    fn account_rejects_password_close_to_email() {
        let mut errors = FormErrors::default();
        let account = clean_account(
            &mut errors,
            "greenvalley@example.org",
            "greenvalley1",
            "greenvalley1",
        );
        assert_eq!(account, None);
        assert_eq!(errors.get("password2"), [PASSWORD_TOO_SIMILAR.to_string()]);
    }

    #[test]
    fn account_accepts_good_input() {
        let mut errors = FormErrors::default();
        let account = clean_account(&mut errors, "Ann@Example.org", "Tomato-Soup-77", "Tomato-Soup-77");
        assert_eq!(
            account,
            Some(("Ann@example.org".to_string(), "Tomato-Soup-77".to_string()))
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn quick_ratio_ignores_order() {
        assert_eq!(quick_ratio("abc", "abc"), 1.0);
        assert_eq!(quick_ratio("abc", "xyz"), 0.0);
        assert_eq!(quick_ratio("cba", "abc"), 1.0);
        assert!(quick_ratio("kitchen", "kitten") > 0.7);
    }

    #[test]
    fn reversed_local_part_is_too_similar() {
        let mut errors = FormErrors::default();
        let account = clean_account(
            &mut errors,
            "greenvalley@example.org",
            "yellavneerg",
            "yellavneerg",
        );
        assert_eq!(account, None);
        assert_eq!(errors.get("password2"), [PASSWORD_TOO_SIMILAR.to_string()]);
    }

    #[test]
    fn long_password_is_not_compared_with_short_parts() {
        // "org" shares every letter with the password but is a tenth its length.
        assert!(!is_too_similar("gross-orange-rogue-gorge-organ", "x@y.org"));
    }
}
