//! Authentication API endpoints
//!
//! Handles HTTP requests for user authentication:
//! - POST /api/v1/user/signup - Register a user
//! - POST /api/v1/user/signin - Basic credentials in, session token out
//! - POST /api/v1/user/signout - Log the bearer session out

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{session_token, ApiError, AppState};
use crate::api::responses::{MessageResponse, StatusResponse};
use crate::models::{SignupInput, UserProfile, UserRole};
use crate::services::{AuthenticationFailure, ServiceError};

/// Response header carrying the session token after signin
pub const ACCESS_TOKEN_HEADER: &str = "access-token";

/// Request body for signup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub user_name: String,
    pub email_address: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub about_me: Option<String>,
    pub dob: Option<String>,
    pub contact_number: Option<String>,
}

impl From<SignupRequest> for SignupInput {
    // Public signup always creates a standard user
    fn from(req: SignupRequest) -> Self {
        Self {
            username: req.user_name,
            email: req.email_address,
            password: req.password,
            role: Some(UserRole::Standard),
            profile: UserProfile {
                first_name: req.first_name,
                last_name: req.last_name,
                country: req.country,
                about_me: req.about_me,
                dob: req.dob,
                contact_number: req.contact_number,
            },
        }
    }
}

/// Build the user auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}

/// Decode a `Basic base64(username:password)` credential.
///
/// Returns `None` for a missing prefix, bad base64, non-UTF-8 content or a
/// missing `:`. The password may itself contain `:`.
pub fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = data_encoding::BASE64.decode(encoded.as_bytes()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// POST /api/v1/user/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.signup(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::new(user.uuid, "USER SUCCESSFULLY REGISTERED")),
    ))
}

/// POST /api/v1/user/signin
async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let (username, password) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_credentials)
        .ok_or(ServiceError::AuthenticationFailed(
            AuthenticationFailure::BadPassword,
        ))?;

    let session = state.user_service.signin(&username, &password).await?;

    let token = HeaderValue::from_str(&session.token)
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Unencodable token: {}", e)))?;

    Ok((
        [(ACCESS_TOKEN_HEADER, token)],
        Json(MessageResponse::new(session.uuid(), "SIGNED IN SUCCESSFULLY")),
    ))
}

/// POST /api/v1/user/signout
async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state.user_service.signout(&session_token(&headers)).await?;

    Ok(Json(MessageResponse::new(user.uuid, "SIGNED OUT SUCCESSFULLY")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", data_encoding::BASE64.encode(raw.as_bytes()))
    }

    #[test]
    fn test_parse_basic_credentials() {
        assert_eq!(
            parse_basic_credentials(&basic("alice:secret")),
            Some(("alice".to_string(), "secret".to_string()))
        );
        assert_eq!(
            parse_basic_credentials(&basic("alice:a:b")),
            Some(("alice".to_string(), "a:b".to_string()))
        );
        assert_eq!(
            parse_basic_credentials(&basic("alice:")),
            Some(("alice".to_string(), String::new()))
        );
    }

    #[test]
    fn test_parse_basic_credentials_malformed() {
        assert_eq!(parse_basic_credentials(&basic("no-colon")), None);
        assert_eq!(parse_basic_credentials("Basic !!!not-base64"), None);
        assert_eq!(parse_basic_credentials("Bearer abc"), None);
        assert_eq!(parse_basic_credentials(""), None);
        let invalid_utf8 = format!("Basic {}", data_encoding::BASE64.encode(&[0xff, b':', 0xfe]));
        assert_eq!(parse_basic_credentials(&invalid_utf8), None);
    }

    #[test]
    fn test_signup_request_is_always_standard() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"userName":"bob","emailAddress":"bob@example.com","password":"pw","role":"admin","country":"NZ"}"#,
        )
        .unwrap();
        let input = SignupInput::from(req);
        assert_eq!(input.role, Some(UserRole::Standard));
        assert_eq!(input.profile.country.as_deref(), Some("NZ"));
    }
}
