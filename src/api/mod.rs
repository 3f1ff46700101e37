//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints of the Q&A backend:
//! - User signup, signin and signout
//! - User profile
//! - Admin user deletion
//! - Question and answer endpoints

pub mod admin;
pub mod answers;
pub mod auth;
pub mod middleware;
pub mod questions;
pub mod responses;
pub mod users;


use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState};

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/user", auth::router())
        .nest("/admin", admin::router())
        .nest("/question", questions::router())
        .merge(users::router())
        .merge(answers::router())
}

/// CORS for the configured origin; `*` allows any origin.
fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([HeaderName::from_static(auth::ACCESS_TOKEN_HEADER)]);

    if cors_origin == "*" {
        return cors.allow_origin(Any);
    }
    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", cors_origin);
            cors.allow_origin(Any)
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
