use askama::Template;
use axum::{extract::State, response::Response, Extension};
use tracing::warn;

use crate::error::AppError;
use crate::models::UserType;
use crate::services::dashboard_service::{self, DashboardView};
use crate::state::AppState;
use crate::web::flash::{Flash, FlashMessage};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::{render, LOGIN_PATH};

pub const ACCESS_DENIED: &str = "Access Denied.";

#[derive(Template)]
#[template(path = "donor_dashboard.html")]
pub struct DonorDashboardTemplate {
    pub messages: Vec<FlashMessage>,
    pub view: DashboardView,
}

#[derive(Template)]
#[template(path = "foodbank_dashboard.html")]
pub struct FoodbankDashboardTemplate {
    pub messages: Vec<FlashMessage>,
    pub view: DashboardView,
}

#[derive(Template)]
#[template(path = "recipient_dashboard.html")]
pub struct RecipientDashboardTemplate {
    pub messages: Vec<FlashMessage>,
    pub view: DashboardView,
}

/// Wrong role is an authorization failure: back to login, not a 403.
fn access_denied(mut flash: Flash, auth: &AuthenticatedUser, expected: UserType) -> Response {
    warn!(
        "user {} ({}) denied {} dashboard",
        auth.user.id, auth.user.user_type, expected
    );
    flash.error(ACCESS_DENIED);
    flash.redirect(LOGIN_PATH)
}

pub async fn donor_dashboard_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    mut flash: Flash,
) -> Result<Response, AppError> {
    if auth.user.user_type != UserType::Donor.as_str() {
        return Ok(access_denied(flash, &auth, UserType::Donor));
    }

    let view = dashboard_service::load_dashboard_view(&state.pool, &auth.user).await?;
    let template = DonorDashboardTemplate {
        messages: flash.take(),
        view,
    };
    Ok(flash.apply(render(&template)?))
}

pub async fn foodbank_dashboard_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    mut flash: Flash,
) -> Result<Response, AppError> {
    if auth.user.user_type != UserType::Foodbank.as_str() {
        return Ok(access_denied(flash, &auth, UserType::Foodbank));
    }

    let view = dashboard_service::load_dashboard_view(&state.pool, &auth.user).await?;
    let template = FoodbankDashboardTemplate {
        messages: flash.take(),
        view,
    };
    Ok(flash.apply(render(&template)?))
}

pub async fn recipient_dashboard_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    mut flash: Flash,
) -> Result<Response, AppError> {
    if auth.user.user_type != UserType::Recipient.as_str() {
        return Ok(access_denied(flash, &auth, UserType::Recipient));
    }

    let view = dashboard_service::load_dashboard_view(&state.pool, &auth.user).await?;
    let template = RecipientDashboardTemplate {
        messages: flash.take(),
        view,
    };
    Ok(flash.apply(render(&template)?))
}
