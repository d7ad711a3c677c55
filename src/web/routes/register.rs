use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Response,
    Form,
};
use tracing::{debug, warn};

use super::start_session;
use crate::database::user_repo;
use crate::error::AppError;
use crate::forms::{
    self, DonorRegistrationForm, FoodbankRegistrationForm, FormErrors, PictureField,
    RecipientRegistrationForm, Registration,
};
use crate::models::{DonationPreference, PreferredDonorType};
use crate::services::registration_service::{self, RegistrationError};
use crate::state::AppState;
use crate::web::cookies;
use crate::web::flash::{Flash, FlashMessage};
use crate::web::{render, LOGIN_PATH};

pub const REGISTRATION_SUCCEEDED: &str = "Registration successful.";
pub const REGISTRATION_FAILED: &str = "Unsuccessful registration. Invalid information.";

enum Outcome {
    Registered(Response),
    Rejected(Flash, FormErrors),
}

/// Writes a cleaned registration and logs the new user in, or hands the form
/// errors back (with the duplicate-email check folded in) for a re-render.
async fn complete_registration(
    state: &AppState,
    headers: &HeaderMap,
    mut flash: Flash,
    raw_email: &str,
    cleaned: Result<Registration, FormErrors>,
) -> Result<Outcome, AppError> {
    let registration = match cleaned {
        Ok(registration) => registration,
        Err(mut errors) => {
            if !errors.has("email") {
                if let Ok(email) = forms::clean_email(raw_email) {
                    if user_repo::email_exists(&state.pool, &email).await? {
                        errors.add("email", forms::DUPLICATE_EMAIL);
                    }
                }
            }
            flash.error(REGISTRATION_FAILED);
            return Ok(Outcome::Rejected(flash, errors));
        }
    };

    let role = registration.profile.user_type();
    let user = match registration_service::register_account(
        &state.pool,
        state.hasher.clone(),
        &state.config.media_root,
        registration,
    )
    .await
    {
        Ok(user) => user,
        Err(RegistrationError::DuplicateEmail) => {
            let mut errors = FormErrors::default();
            errors.add("email", forms::DUPLICATE_EMAIL);
            flash.error(REGISTRATION_FAILED);
            return Ok(Outcome::Rejected(flash, errors));
        }
        Err(RegistrationError::PasswordHash(e)) => return Err(e.into()),
        Err(RegistrationError::Io(e)) => return Err(e.into()),
        Err(RegistrationError::Database(e)) => return Err(e.into()),
    };

    let session = start_session(state, headers, &user).await?;
    flash.success(REGISTRATION_SUCCEEDED);

    let mut response = flash.redirect(role.dashboard_path().unwrap_or(LOGIN_PATH));
    cookies::append_cookie(
        &mut response,
        &cookies::session_cookie(&session, state.config.session_cookie_secure),
    );
    Ok(Outcome::Registered(response))
}

#[derive(Template)]
#[template(path = "donor_register.html")]
pub struct DonorRegisterTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: DonorRegistrationForm,
    pub errors: FormErrors,
    pub donor_types: &'static [PreferredDonorType],
    pub donation_preferences: &'static [DonationPreference],
}

fn donor_page(
    mut flash: Flash,
    form: DonorRegistrationForm,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let template = DonorRegisterTemplate {
        messages: flash.take(),
        form,
        errors,
        donor_types: &PreferredDonorType::ALL,
        donation_preferences: &DonationPreference::ALL,
    };
    Ok(flash.apply(render(&template)?))
}

pub async fn donor_register_page(flash: Flash) -> Result<Response, AppError> {
    donor_page(flash, DonorRegistrationForm::default(), FormErrors::default())
}

pub async fn donor_register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    flash: Flash,
    Form(form): Form<DonorRegistrationForm>,
) -> Result<Response, AppError> {
    let cleaned = form.clean();
    match complete_registration(&state, &headers, flash, &form.email, cleaned).await? {
        Outcome::Registered(response) => Ok(response),
        Outcome::Rejected(flash, errors) => donor_page(flash, form, errors),
    }
}

#[derive(Template)]
#[template(path = "foodbank_register.html")]
pub struct FoodbankRegisterTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: FoodbankRegistrationForm,
    pub errors: FormErrors,
}

fn foodbank_page(
    mut flash: Flash,
    form: FoodbankRegistrationForm,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let template = FoodbankRegisterTemplate {
        messages: flash.take(),
        form,
        errors,
    };
    Ok(flash.apply(render(&template)?))
}

pub async fn foodbank_register_page(flash: Flash) -> Result<Response, AppError> {
    foodbank_page(flash, FoodbankRegistrationForm::default(), FormErrors::default())
}

async fn read_foodbank_form(mut multipart: Multipart) -> Result<FoodbankRegistrationForm, AppError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        warn!("unreadable multipart body: {}", e);
        AppError::MalformedPayload
    };

    let mut form = FoodbankRegistrationForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "picture" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(malformed)?;
            // Browsers send an empty part when no file was chosen.
            if !bytes.is_empty() {
                debug!("picture upload {} ({} bytes)", file_name, bytes.len());
                form.picture = Some(PictureField {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }
        let value = field.text().await.map_err(malformed)?;
        form.set_field(&name, value);
    }
    Ok(form)
}

pub async fn foodbank_register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    flash: Flash,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_foodbank_form(multipart).await?;
    let cleaned = form.clean();
    match complete_registration(&state, &headers, flash, &form.email, cleaned).await? {
        Outcome::Registered(response) => Ok(response),
        Outcome::Rejected(flash, errors) => foodbank_page(flash, form, errors),
    }
}

#[derive(Template)]
#[template(path = "recipient_register.html")]
pub struct RecipientRegisterTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: RecipientRegistrationForm,
    pub errors: FormErrors,
}

fn recipient_page(
    mut flash: Flash,
    form: RecipientRegistrationForm,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let template = RecipientRegisterTemplate {
        messages: flash.take(),
        form,
        errors,
    };
    Ok(flash.apply(render(&template)?))
}

pub async fn recipient_register_page(flash: Flash) -> Result<Response, AppError> {
    recipient_page(flash, RecipientRegistrationForm::default(), FormErrors::default())
}

pub async fn recipient_register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    flash: Flash,
    Form(form): Form<RecipientRegistrationForm>,
) -> Result<Response, AppError> {
    let cleaned = form.clean();
    match complete_registration(&state, &headers, flash, &form.email, cleaned).await? {
        Outcome::Registered(response) => Ok(response),
        Outcome::Rejected(flash, errors) => recipient_page(flash, form, errors),
    }
}
