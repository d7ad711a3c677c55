//! Cross-site request forgery check for state-changing requests.
//!
//! Browsers attach `Origin` (or at least `Referer`) to form posts and a page
//! cannot forge either, so an unsafe request is accepted only when one of
//! them names this host or a configured trusted origin.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

pub const REASON_BAD_ORIGIN: &str = "Origin checking failed - does not match any trusted origins.";
pub const REASON_BAD_REFERER: &str =
    "Referer checking failed - does not match any trusted origins.";
pub const REASON_MALFORMED_REFERER: &str = "Referer checking failed - Referer is malformed.";
pub const REASON_NO_REFERER: &str = "Referer checking failed - no Referer.";

pub async fn verify_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe(request.method()) {
        return next.run(request).await;
    }

    match check_request_origin(request.headers(), &state.config.csrf_trusted_origins) {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            warn!(
                "rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                reason
            );
            AppError::CsrfRejected.into_response()
        }
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// `Ok` when `Origin`, or failing that `Referer`, points at the request's own
/// `Host` or at one of `trusted`.
pub fn check_request_origin(headers: &HeaderMap, trusted: &[String]) -> Result<(), &'static str> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    if let Some(origin) = headers.get(header::ORIGIN) {
        let origin = origin.to_str().map_err(|_| REASON_BAD_ORIGIN)?;
        let same_host = authority_of(origin).is_some_and(|authority| matches_host(&authority, host));
        let listed = trusted.iter().any(|t| t == origin);
        return if same_host || listed {
            Ok(())
        } else {
            Err(REASON_BAD_ORIGIN)
        };
    }

    let referer = headers
        .get(header::REFERER)
        .ok_or(REASON_NO_REFERER)?
        .to_str()
        .map_err(|_| REASON_MALFORMED_REFERER)?;
    let authority = authority_of(referer).ok_or(REASON_MALFORMED_REFERER)?;
    let listed = trusted
        .iter()
        .any(|t| referer == t || referer.starts_with(&format!("{t}/")));
    if matches_host(&authority, host) || listed {
        Ok(())
    } else {
        Err(REASON_BAD_REFERER)
    }
}

fn authority_of(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    uri.scheme()?;
    uri.authority().map(|authority| authority.as_str().to_string())
}

fn matches_host(authority: &str, host: Option<&str>) -> bool {
    host.is_some_and(|host| authority.eq_ignore_ascii_case(host))
}
