use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::error::AppError;
use crate::models::UsersRow;
use crate::services::session_service;
use crate::state::AppState;
use crate::web::cookies::{self, SESSION_COOKIE};
use crate::web::LOGIN_PATH;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: UsersRow,
    pub session_token: String,
}

/// Lets the request through only with a live session; otherwise redirects to
/// the login page with `next` set to the requested path.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = cookies::read_cookie(request.headers(), SESSION_COOKIE);
    let had_token = token.is_some();

    if let Some(token) = token {
        match session_service::resolve_session(&state.pool, &token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser {
                    user,
                    session_token: token,
                });
                return next.run(request).await;
            }
            Ok(None) => debug!("session cookie no longer valid"),
            Err(e) => return AppError::from(e).into_response(),
        }
    }

    let target = format!("{}?next={}", LOGIN_PATH, request.uri().path());
    let mut response = Redirect::to(&target).into_response();
    if had_token {
        cookies::append_cookie(&mut response, &cookies::removal_cookie(SESSION_COOKIE));
    }
    response
}
