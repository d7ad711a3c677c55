pub mod auth;
pub mod dashboard;
pub mod register;

use axum::http::HeaderMap;

use crate::error::AppError;
use crate::models::UsersRow;
use crate::services::session_service::{self, IssuedSession};
use crate::state::AppState;
use crate::web::cookies::{self, SESSION_COOKIE};

/// Logs `user` in, discarding whatever session the request arrived with.
pub(crate) async fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    user: &UsersRow,
) -> Result<IssuedSession, AppError> {
    if let Some(previous) = cookies::read_cookie(headers, SESSION_COOKIE) {
        session_service::logout(&state.pool, &previous).await?;
    }
    Ok(session_service::login(&state.pool, user, state.config.session_ttl).await?)
}
