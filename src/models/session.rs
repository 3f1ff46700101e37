//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session issued at signin.
///
/// A session is never hard-deleted. Expiry and logout are both terminal, and
/// both are judged lazily from the stored timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token value handed to the client
    #[serde(skip_serializing)]
    pub token: String,
    /// Public uuid of the owning user
    pub user_uuid: Uuid,
    /// Issue timestamp
    pub issued_at: DateTime<Utc>,
    /// Expiration timestamp (issued_at + TTL)
    pub expires_at: DateTime<Utc>,
    /// Set exactly once, on logout
    pub logged_out_at: Option<DateTime<Utc>>,
}

/// Why a resolved session is no longer usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Expired,
    LoggedOut,
}

/// Derived validity of a session at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Invalid(InvalidReason),
}

impl Session {
    /// Public uuid of the session, which is the owning user's uuid
    pub fn uuid(&self) -> Uuid {
        self.user_uuid
    }

    /// The one validity rule: active iff not logged out and `now < expires_at`.
    ///
    /// Logout wins over expiry when both hold.
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.logged_out_at.is_some() {
            SessionStatus::Invalid(InvalidReason::LoggedOut)
        } else if now >= self.expires_at {
            SessionStatus::Invalid(InvalidReason::Expired)
        } else {
            SessionStatus::Active
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == SessionStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(issued_at: DateTime<Utc>) -> Session {
        Session {
            token: "tok".to_string(),
            user_uuid: Uuid::new_v4(),
            issued_at,
            expires_at: issued_at + Duration::hours(8),
            logged_out_at: None,
        }
    }

    #[test]
    fn test_fresh_session_is_active() {
        let now = Utc::now();
        let s = session(now);
        assert_eq!(s.status_at(now), SessionStatus::Active);
        assert!(s.is_active_at(now + Duration::hours(7)));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let s = session(now);
        assert_eq!(
            s.status_at(s.expires_at),
            SessionStatus::Invalid(InvalidReason::Expired)
        );
        assert!(s.is_active_at(s.expires_at - Duration::milliseconds(1)));
    }

    #[test]
    fn test_logout_takes_precedence_over_expiry() {
        let now = Utc::now();
        let mut s = session(now);
        s.logged_out_at = Some(now + Duration::minutes(5));
        assert_eq!(
            s.status_at(now + Duration::hours(9)),
            SessionStatus::Invalid(InvalidReason::LoggedOut)
        );
    }

    #[test]
    fn test_session_uuid_is_user_uuid() {
        let s = session(Utc::now());
        assert_eq!(s.uuid(), s.user_uuid);
    }
}
