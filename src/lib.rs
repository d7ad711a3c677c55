pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::get,
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

use web::middleware::{auth as auth_middleware, csrf};
use web::routes::{auth, dashboard, register};

pub fn build_router(state: AppState) -> Router {
    // Session-gated routes under one middleware layer
    let protected_routes = Router::new()
        .route(
            "/logout/",
            get(auth::logout_handler).post(auth::logout_handler),
        )
        .route("/dashboard/donor/", get(dashboard::donor_dashboard_handler))
        .route(
            "/dashboard/foodbank/",
            get(dashboard::foodbank_dashboard_handler),
        )
        .route(
            "/dashboard/recipient/",
            get(dashboard::recipient_dashboard_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    Router::new()
        // Public routes
        .route("/", get(|| async { Redirect::to(web::LOGIN_PATH) }))
        .route("/login/", get(auth::login_page).post(auth::login_handler))
        .route(
            "/register/donor/",
            get(register::donor_register_page).post(register::donor_register_handler),
        )
        .route(
            "/register/foodbank/",
            get(register::foodbank_register_page).post(register::foodbank_register_handler),
        )
        .route(
            "/register/recipient/",
            get(register::recipient_register_page).post(register::recipient_register_handler),
        )
        .merge(protected_routes)
        // Uploaded pictures
        .nest_service("/media", ServeDir::new(&state.config.media_root))
        // Layers
        .layer(middleware::from_fn_with_state(
            state.clone(),
            csrf::verify_origin,
        ))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
