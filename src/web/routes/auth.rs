use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    Extension, Form,
};
use tracing::{info, warn};

use super::start_session;
use crate::error::AppError;
use crate::forms::{FormErrors, LoginForm};
use crate::models::UserType;
use crate::services::auth_service::{self, AuthError};
use crate::services::session_service;
use crate::state::AppState;
use crate::web::cookies::{self, SESSION_COOKIE};
use crate::web::flash::{Flash, FlashMessage};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::{render, LOGIN_PATH};

pub const INVALID_LOGIN_FORM: &str =
    "Invalid form submission. Please check your email and password.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const UNKNOWN_USER_TYPE: &str = "User type not recognized.";
pub const LOGGED_OUT: &str = "You have successfully logged out.";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub messages: Vec<FlashMessage>,
    pub username: String,
    pub errors: FormErrors,
}

fn login_form_page(
    mut flash: Flash,
    username: String,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let template = LoginTemplate {
        messages: flash.take(),
        username,
        errors,
    };
    Ok(flash.apply(render(&template)?))
}

pub async fn login_page(flash: Flash) -> Result<Response, AppError> {
    login_form_page(flash, String::new(), FormErrors::default())
}

pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut flash: Flash,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let credentials = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => {
            flash.error(INVALID_LOGIN_FORM);
            return login_form_page(flash, form.username, errors);
        }
    };

    let user = match auth_service::authenticate(
        &state.pool,
        state.hasher.clone(),
        &credentials.email,
        &credentials.password,
    )
    .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            warn!("failed login for {}", credentials.email);
            flash.error(INVALID_CREDENTIALS);
            return login_form_page(flash, form.username, FormErrors::default());
        }
        Err(AuthError::Database(e)) => return Err(e.into()),
    };

    let session = start_session(&state, &headers, &user).await?;
    flash.info(format!("You are now logged in as {}.", user.email));

    // Exact discriminator match; ADMIN and anything unknown have no dashboard.
    let target = match user.role().and_then(UserType::dashboard_path) {
        Some(path) => path,
        None => {
            warn!("user {} has no dashboard for role {:?}", user.id, user.user_type);
            flash.error(UNKNOWN_USER_TYPE);
            LOGIN_PATH
        }
    };

    let mut response = flash.redirect(target);
    cookies::append_cookie(
        &mut response,
        &cookies::session_cookie(&session, state.config.session_cookie_secure),
    );
    Ok(response)
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    mut flash: Flash,
) -> Result<Response, AppError> {
    session_service::logout(&state.pool, &auth.session_token).await?;
    info!("user {} logged out", auth.user.id);

    flash.info(LOGGED_OUT);
    let mut response = flash.redirect(LOGIN_PATH);
    cookies::append_cookie(&mut response, &cookies::removal_cookie(SESSION_COOKIE));
    Ok(response)
}
