use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};
use chrono::Utc;
use cookie::{time::Duration, Cookie, SameSite};
use tracing::warn;

use crate::services::session_service::IssuedSession;

pub const SESSION_COOKIE: &str = "sessionid";

/// Value of the first non-empty cookie called `name`.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("dropping unencodable cookie {}: {}", cookie.name(), e),
    }
}

pub fn base_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub fn session_cookie(session: &IssuedSession, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(SESSION_COOKIE, session.token.clone());
    let seconds = (session.expires_at - Utc::now()).num_seconds().max(0);
    cookie.set_max_age(Duration::seconds(seconds));
    cookie.set_secure(secure);
    cookie
}

pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = base_cookie(name, String::new());
    cookie.make_removal();
    cookie
}
