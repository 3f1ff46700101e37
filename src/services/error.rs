//! Service error taxonomy
//!
//! Every rejection the services can produce, each with a stable
//! `(code, message)` pair that the boundary echoes verbatim.

use crate::models::DuplicateCredential;

/// Why signin failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationFailure {
    UnknownUser,
    /// Wrong password, or a credential that could not be decoded
    BadPassword,
}

/// Why an authorized call was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationFailure {
    NotSignedIn,
    SessionExpiredOrLoggedOut,
    NotOwner,
    NotAdmin,
}

/// Kind of resource that could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Question,
    Answer,
}

/// Error type shared by the user, question and answer services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Authentication failed: {0:?}")]
    AuthenticationFailed(AuthenticationFailure),

    #[error("Authorization failed: {0:?}")]
    AuthorizationFailed(AuthorizationFailure),

    #[error("Duplicate credential: {0:?}")]
    DuplicateCredential(DuplicateCredential),

    #[error("{0:?} not found")]
    NotFound(ResourceKind),

    #[error("Sign out restricted")]
    SignOutRestricted,

    /// Store failure; never a user-facing validation outcome
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Internal(e.into())
    }
}

impl ServiceError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        use AuthenticationFailure::*;
        use AuthorizationFailure::*;

        match self {
            ServiceError::AuthenticationFailed(UnknownUser) => "ATH-001",
            ServiceError::AuthenticationFailed(BadPassword) => "ATH-002",
            ServiceError::AuthorizationFailed(NotSignedIn) => "ATHR-001",
            ServiceError::AuthorizationFailed(SessionExpiredOrLoggedOut) => "ATHR-002",
            ServiceError::AuthorizationFailed(NotOwner | NotAdmin) => "ATHR-003",
            ServiceError::DuplicateCredential(DuplicateCredential::UsernameTaken) => "SGR-001",
            ServiceError::DuplicateCredential(DuplicateCredential::EmailTaken) => "SGR-002",
            ServiceError::NotFound(ResourceKind::User) => "USR-001",
            ServiceError::NotFound(ResourceKind::Question) => "QUES-001",
            ServiceError::NotFound(ResourceKind::Answer) => "ANS-001",
            ServiceError::SignOutRestricted => "SGR-001",
            ServiceError::Internal(_) => "GEN-001",
        }
    }

    /// Stable user-facing message
    pub fn message(&self) -> &'static str {
        use AuthenticationFailure::*;
        use AuthorizationFailure::*;

        match self {
            ServiceError::AuthenticationFailed(UnknownUser) => "This username does not exist",
            ServiceError::AuthenticationFailed(BadPassword) => "Password failed",
            ServiceError::AuthorizationFailed(NotSignedIn) => "User has not signed in",
            ServiceError::AuthorizationFailed(SessionExpiredOrLoggedOut) => {
                "User is signed out. Sign in first"
            }
            ServiceError::AuthorizationFailed(NotOwner) => {
                "Only the owner can edit this content, or the owner or an admin can delete it"
            }
            ServiceError::AuthorizationFailed(NotAdmin) => {
                "Unauthorized Access, Entered user is not an admin"
            }
            ServiceError::DuplicateCredential(DuplicateCredential::UsernameTaken) => {
                "Try any other Username, this Username has already been taken"
            }
            ServiceError::DuplicateCredential(DuplicateCredential::EmailTaken) => {
                "This user has already been registered, try with any other emailId"
            }
            ServiceError::NotFound(ResourceKind::User) => "User with entered uuid does not exist",
            ServiceError::NotFound(ResourceKind::Question) => "Entered question uuid does not exist",
            ServiceError::NotFound(ResourceKind::Answer) => "Entered answer uuid does not exist",
            ServiceError::SignOutRestricted => "User is not Signed in",
            ServiceError::Internal(_) => {
                "An unexpected error occurred. Please contact System Administrator"
            }
        }
    }
}
