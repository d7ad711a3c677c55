#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use cookie::Cookie;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use foodbank::database::{self, schema};
use foodbank::services::password_service::Argon2Hasher;
use foodbank::web::cookies::SESSION_COOKIE;
use foodbank::web::flash::{self, FlashMessage, MESSAGES_COOKIE};
use foodbank::{build_router, AppState, Config};

pub const PASSWORD: &str = "Harvest-Basket-77";
pub const SECRET_KEY: &str = "test-secret-key";
/// Host the test requests claim; POSTs carry a matching `Origin`.
pub const HOST: &str = "testserver";
pub const ORIGIN: &str = "http://testserver";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media: TempDir,
}

/// Fresh in-memory database and media directory per test.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let media = tempfile::tempdir().expect("media tempdir");
    let pool = database::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    schema::migrate(&pool).await.expect("migrate");

    let mut config = Config {
        database_url: "sqlite::memory:".to_string(),
        media_root: media.path().to_path_buf(),
        secret_key: SECRET_KEY.to_string(),
        ..Config::default()
    };
    configure(&mut config);
    // Cheap parameters keep the suite fast.
    let hasher = Argon2Hasher::with_params(1024, 1, 1).expect("argon2 params");
    let state = AppState::new(pool.clone(), config, hasher);

    TestApp {
        router: build_router(state),
        pool,
        media,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri).header(header::HOST, HOST);
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        session: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::post(uri)
            .header(header::HOST, HOST)
            .header(header::ORIGIN, ORIGIN)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }
        self.send(builder.body(Body::from(form_body(fields))).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Response<Body> {
        let boundary = "foodbank-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, file_name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::post(uri)
            .header(header::HOST, HOST)
            .header(header::ORIGIN, ORIGIN)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("count rows")
    }

    /// Registers a donor over HTTP and returns its session token.
    pub async fn register_donor(&self, email: &str) -> String {
        let response = self.post_form("/register/donor/", &donor_fields(email), None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_token(&response).expect("session cookie after registration")
    }

    pub async fn register_foodbank(&self, email: &str) -> String {
        let response = self
            .post_multipart("/register/foodbank/", &foodbank_fields(email), None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_token(&response).expect("session cookie after registration")
    }

    pub async fn register_recipient(&self, email: &str) -> String {
        let response = self
            .post_form("/register/recipient/", &recipient_fields(email), None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_token(&response).expect("session cookie after registration")
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        self.post_form(
            "/login/",
            &[("username", email), ("password", password)],
            None,
        )
        .await
    }
}

pub fn donor_fields(email: &str) -> Vec<(&str, &str)> {
    vec![
        ("email", email),
        ("password1", PASSWORD),
        ("password2", PASSWORD),
        ("full_name", "Wanjiru Kamau"),
        ("phone_number", "+254700000001"),
        ("location", "Nakuru"),
        ("preferred_donor_type", "FOOD"),
        ("donation_preference", "FREE"),
    ]
}

pub fn foodbank_fields(email: &str) -> Vec<(&str, &str)> {
    vec![
        ("email", email),
        ("password1", PASSWORD),
        ("password2", PASSWORD),
        ("foodbank_name", "Kibera Community Pantry"),
        ("phone_number", "+254700000002"),
        ("contact_person", "Otieno Odhiambo"),
        ("accepts_subsistence_donations", "on"),
    ]
}

pub fn recipient_fields(email: &str) -> Vec<(&str, &str)> {
    vec![
        ("email", email),
        ("password1", PASSWORD),
        ("password2", PASSWORD),
        ("full_name_or_organization", "Hope Shelter"),
        ("phone_number", "+254700000003"),
        ("contact_person", "Achieng Njeri"),
        ("location", "Nairobi"),
        ("category", "Shelter"),
    ]
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw.to_string()).ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Non-empty `sessionid` set by the response.
pub fn session_token(response: &Response<Body>) -> Option<String> {
    set_cookie_value(response, SESSION_COOKIE).filter(|v| !v.is_empty())
}

/// Whether the response tells the browser to drop the session cookie.
pub fn clears_session(response: &Response<Body>) -> bool {
    set_cookie_value(response, SESSION_COOKIE).is_some_and(|v| v.is_empty())
}

pub fn flash_messages(response: &Response<Body>) -> Vec<FlashMessage> {
    set_cookie_value(response, MESSAGES_COOKIE)
        .map(|value| flash::decode(&value, SECRET_KEY.as_bytes()))
        .unwrap_or_default()
}

pub fn flash_texts(response: &Response<Body>) -> Vec<String> {
    flash_messages(response)
        .into_iter()
        .map(|m| m.text)
        .collect()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
