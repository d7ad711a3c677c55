pub mod cookies;
pub mod flash;
pub mod middleware;
pub mod routes;

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use crate::error::AppError;

pub const LOGIN_PATH: &str = "/login/";

pub fn render<T: Template>(template: &T) -> Result<Response, AppError> {
    Ok(Html(template.render()?).into_response())
}
