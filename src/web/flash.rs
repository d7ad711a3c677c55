//! One-shot messages carried across a redirect in the `messages` cookie.
//!
//! The cookie is `<payload>.<mac>`: base64url JSON and its HMAC-SHA256 under
//! the configured secret key. Anything that fails the check is dropped.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::cookies;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const MESSAGES_COOKIE: &str = "messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    pub fn css_class(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

fn sign(key: &[u8], payload: &str) -> Option<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).ok()?;
    mac.update(payload.as_bytes());
    Some(mac)
}

pub fn encode(messages: &[FlashMessage], key: &[u8]) -> String {
    let Ok(json) = serde_json::to_vec(messages) else {
        return String::new();
    };
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(json);
    let Some(mac) = sign(key, &payload) else {
        return String::new();
    };
    let tag = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{payload}.{tag}")
}

/// Tampered, unsigned or stale cookies decode to nothing.
pub fn decode(value: &str, key: &[u8]) -> Vec<FlashMessage> {
    let Some((payload, tag)) = value.split_once('.') else {
        return Vec::new();
    };
    let Ok(tag) = general_purpose::URL_SAFE_NO_PAD.decode(tag) else {
        return Vec::new();
    };

    let verified = sign(key, payload).is_some_and(|mac| mac.verify_slice(&tag).is_ok());
    if !verified {
        return Vec::new();
    }

    general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

/// Pending messages: those left by the previous response plus any queued now.
///
/// Rendering a page [`take`](Flash::take)s them; [`apply`](Flash::apply) then
/// writes whatever is left back to the cookie, or clears it.
#[derive(Debug)]
pub struct Flash {
    messages: Vec<FlashMessage>,
    had_cookie: bool,
    key: Vec<u8>,
}

#[async_trait]
impl FromRequestParts<AppState> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = state.config.secret_key.as_bytes().to_vec();
        let raw = cookies::read_cookie(&parts.headers, MESSAGES_COOKIE);
        Ok(Flash {
            had_cookie: raw.is_some(),
            messages: raw
                .as_deref()
                .map(|value| decode(value, &key))
                .unwrap_or_default(),
            key,
        })
    }
}

impl Flash {
    /// An empty queue signing with `key`.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            messages: Vec::new(),
            had_cookie: false,
            key: key.into(),
        }
    }

    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        self.messages.push(FlashMessage {
            level,
            text: text.into(),
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Level::Success, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text);
    }

    pub fn take(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn apply(self, mut response: Response) -> Response {
        if !self.messages.is_empty() {
            let cookie = cookies::base_cookie(MESSAGES_COOKIE, encode(&self.messages, &self.key));
            cookies::append_cookie(&mut response, &cookie);
        } else if self.had_cookie {
            cookies::append_cookie(&mut response, &cookies::removal_cookie(MESSAGES_COOKIE));
        }
        response
    }

    pub fn redirect(self, to: &str) -> Response {
        self.apply(Redirect::to(to).into_response())
    }
}
