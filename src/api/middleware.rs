//! API plumbing shared by every handler
//!
//! Contains:
//! - `AppState` with the resource services
//! - `ApiError`, the `{error: {code, message}}` body and its HTTP status
//! - Bearer token extraction
//!
//! There is no authentication middleware: handlers pass the raw token to
//! the service, which authorizes inside the same transaction as the work.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::services::{
    AnswerService, AuthenticationFailure, AuthorizationFailure, QuestionService, ServiceError,
    Services, UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub question_service: Arc<QuestionService>,
    pub answer_service: Arc<AnswerService>,
}

impl From<Services> for AppState {
    fn from(services: Services) -> Self {
        Self {
            user_service: services.users,
            question_service: services.questions,
            answer_service: services.answers,
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// HTTP status for each service error kind
fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::AuthenticationFailed(
            AuthenticationFailure::UnknownUser | AuthenticationFailure::BadPassword,
        ) => StatusCode::UNAUTHORIZED,
        ServiceError::AuthorizationFailed(
            AuthorizationFailure::NotSignedIn | AuthorizationFailure::SessionExpiredOrLoggedOut,
        ) => StatusCode::UNAUTHORIZED,
        ServiceError::AuthorizationFailed(
            AuthorizationFailure::NotOwner | AuthorizationFailure::NotAdmin,
        ) => StatusCode::FORBIDDEN,
        ServiceError::DuplicateCredential(_) => StatusCode::CONFLICT,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::SignOutRestricted => StatusCode::UNAUTHORIZED,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if let ServiceError::Internal(e) = &err {
            tracing::error!("Internal error: {:#}", e);
        }
        Self::new(status_for(&err), err.code(), err.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Extract the bearer token from the `authorization` header.
///
/// Returns `None` when the header is missing, not UTF-8, or not a Bearer
/// credential.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Token to hand to a service; an absent credential resolves no session.
pub fn session_token(headers: &HeaderMap) -> String {
    extract_bearer_token(headers).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DuplicateCredential;
    use crate::services::ResourceKind;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc")).as_deref(), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("Basic abc")), None);
        assert_eq!(extract_bearer_token(&headers("abc")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&HeaderMap::new()), "");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::AuthenticationFailed(AuthenticationFailure::BadPassword),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::AuthorizationFailed(AuthorizationFailure::SessionExpiredOrLoggedOut),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::AuthorizationFailed(AuthorizationFailure::NotAdmin),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::DuplicateCredential(DuplicateCredential::UsernameTaken),
                StatusCode::CONFLICT,
            ),
            (ServiceError::NotFound(ResourceKind::Answer), StatusCode::NOT_FOUND),
            (ServiceError::SignOutRestricted, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let code = err.code();
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.error.code, code);
        }
    }

    #[test]
    fn test_error_body_shape() {
        let api = ApiError::from(ServiceError::NotFound(ResourceKind::Question));
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["error"]["code"], "QUES-001");
        assert_eq!(json["error"]["message"], "Entered question uuid does not exist");
        assert!(json.get("status").is_none());
    }
}
