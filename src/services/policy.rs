//! Authorization policy engine
//!
//! The single place that judges a session and a capability. Resource
//! services ask [`AuthorizationPolicy::authorize`] for a [`Decision`] and
//! never look at session timestamps or compare owners themselves.
//!
//! Evaluation order:
//! 1. no session for the token: `Unauthenticated`
//! 2. session logged out, else past `expires_at`: `SessionInvalid`
//! 3. capability predicate false: `Forbidden`
//! 4. otherwise `Authorized(user)`
//!
//! | Capability                  | Condition beyond an active session          |
//! |-----------------------------|---------------------------------------------|
//! | CreateContent, ReadContent, ReadProfile | none                            |
//! | EditContent                 | requester is the owner                      |
//! | DeleteContent               | requester is the owner, or an admin         |
//! | DeleteUser                  | requester is an admin                       |
//!
//! Owners are compared by uuid only.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{InvalidReason, Session, SessionStatus, User};
use crate::services::error::{AuthorizationFailure, ResourceKind, ServiceError};

/// A class of action checked against a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateContent,
    ReadContent,
    ReadProfile,
    EditContent,
    DeleteContent,
    DeleteUser,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::CreateContent => "create_content",
            Capability::ReadContent => "read_content",
            Capability::ReadProfile => "read_profile",
            Capability::EditContent => "edit_content",
            Capability::DeleteContent => "delete_content",
            Capability::DeleteUser => "delete_user",
        };
        f.write_str(name)
    }
}

/// Why an active session was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forbidden {
    NotOwner,
    NotAdmin,
}

/// Outcome of one authorization check
#[derive(Debug, Clone)]
pub enum Decision {
    Authorized(User),
    Unauthenticated,
    SessionInvalid(InvalidReason),
    Forbidden(Forbidden),
}

impl Decision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Decision::Authorized(_))
    }

    /// Turn the decision into the acting user or the matching service error
    pub fn into_result(self) -> Result<User, ServiceError> {
        match self {
            Decision::Authorized(user) => Ok(user),
            Decision::Unauthenticated => Err(ServiceError::AuthorizationFailed(
                AuthorizationFailure::NotSignedIn,
            )),
            Decision::SessionInvalid(_) => Err(ServiceError::AuthorizationFailed(
                AuthorizationFailure::SessionExpiredOrLoggedOut,
            )),
            Decision::Forbidden(Forbidden::NotOwner) => Err(ServiceError::AuthorizationFailed(
                AuthorizationFailure::NotOwner,
            )),
            Decision::Forbidden(Forbidden::NotAdmin) => Err(ServiceError::AuthorizationFailed(
                AuthorizationFailure::NotAdmin,
            )),
        }
    }
}

/// Capability predicate for a requester whose session is already known to be active.
///
/// An owner-gated capability without an owner is denied.
pub fn permits(
    requester: &User,
    capability: Capability,
    owner: Option<Uuid>,
) -> std::result::Result<(), Forbidden> {
    let is_owner = owner == Some(requester.uuid);

    match capability {
        Capability::CreateContent | Capability::ReadContent | Capability::ReadProfile => Ok(()),
        Capability::EditContent if is_owner => Ok(()),
        Capability::EditContent => Err(Forbidden::NotOwner),
        Capability::DeleteContent if is_owner || requester.is_admin() => Ok(()),
        Capability::DeleteContent => Err(Forbidden::NotOwner),
        Capability::DeleteUser if requester.is_admin() => Ok(()),
        Capability::DeleteUser => Err(Forbidden::NotAdmin),
    }
}

/// Judge a resolved session and its user at `now`.
///
/// `user` is `None` when the session's owner no longer exists, which is
/// treated the same as an unknown token.
pub fn evaluate(
    session: Option<&Session>,
    user: Option<User>,
    capability: Capability,
    owner: Option<Uuid>,
    now: DateTime<Utc>,
) -> Decision {
    let Some(session) = session else {
        return Decision::Unauthenticated;
    };

    if let SessionStatus::Invalid(reason) = session.status_at(now) {
        return Decision::SessionInvalid(reason);
    }

    let Some(user) = user.filter(|u| u.uuid == session.user_uuid) else {
        return Decision::Unauthenticated;
    };

    match permits(&user, capability, owner) {
        Ok(()) => Decision::Authorized(user),
        Err(reason) => Decision::Forbidden(reason),
    }
}

/// Resolves tokens through the session registry and applies [`evaluate`]
#[derive(Clone)]
pub struct AuthorizationPolicy {
    session_repo: Arc<dyn SessionRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl AuthorizationPolicy {
    pub fn new(
        session_repo: Arc<dyn SessionRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
        }
    }

    /// Authorize `token` for `capability` against the current time.
    ///
    /// Run this on the same transaction as the mutation it guards.
    pub async fn authorize(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        capability: Capability,
        owner: Option<Uuid>,
    ) -> Result<Decision> {
        self.authorize_at(conn, token, capability, owner, Utc::now())
            .await
    }

    pub async fn authorize_at(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        capability: Capability,
        owner: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Decision> {
        let session = if token.is_empty() {
            None
        } else {
            self.session_repo.find_by_token_value(&mut *conn, token).await?
        };

        let user = match &session {
            Some(session) if session.is_active_at(now) => {
                self.user_repo.find_by_uuid(&mut *conn, session.user_uuid).await?
            }
            _ => None,
        };

        let decision = evaluate(session.as_ref(), user, capability, owner, now);
        match &decision {
            Decision::Authorized(user) => {
                tracing::debug!("Authorized {} for {}", user.uuid, capability);
            }
            Decision::Unauthenticated => {
                tracing::info!("Rejected {}: no session for token", capability);
            }
            Decision::SessionInvalid(reason) => {
                tracing::info!("Rejected {}: session {:?}", capability, reason);
            }
            Decision::Forbidden(reason) => {
                tracing::info!("Rejected {}: {:?}", capability, reason);
            }
        }

        Ok(decision)
    }

    /// [`authorize`](Self::authorize) folded into the acting user or a service error
    pub async fn require(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        capability: Capability,
        owner: Option<Uuid>,
    ) -> Result<User, ServiceError> {
        self.authorize(conn, token, capability, owner)
            .await?
            .into_result()
    }

    /// Require `capability` on an owned resource that was looked up by uuid.
    ///
    /// `owner` is `None` when the lookup found nothing. The session is still
    /// judged first, as `ReadContent`, so a caller without a valid session
    /// never learns whether the uuid exists; a valid caller gets `NotFound(kind)`.
    pub async fn require_on(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        capability: Capability,
        owner: Option<Uuid>,
        kind: ResourceKind,
    ) -> Result<User, ServiceError> {
        match owner {
            Some(owner) => self.require(conn, token, capability, Some(owner)).await,
            None => {
                self.require(conn, token, Capability::ReadContent, None).await?;
                Err(ServiceError::NotFound(kind))
            }
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::{UserProfile, UserRole};
    use chrono::Duration;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum State {
        Missing,
        Active,
        Expired,
        LoggedOut,
    }

    fn capability_strategy() -> impl Strategy<Value = Capability> {
        prop_oneof![
            Just(Capability::CreateContent),
            Just(Capability::ReadContent),
            Just(Capability::ReadProfile),
            Just(Capability::EditContent),
            Just(Capability::DeleteContent),
            Just(Capability::DeleteUser),
        ]
    }

    fn state_strategy() -> impl Strategy<Value = State> {
        prop_oneof![
            Just(State::Missing),
            Just(State::Active),
            Just(State::Expired),
            Just(State::LoggedOut),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// `evaluate` agrees with the capability table for every combination.
        #[test]
        fn decision_matches_table(
            capability in capability_strategy(),
            state in state_strategy(),
            is_admin in any::<bool>(),
            owns in any::<bool>(),
            has_owner in any::<bool>(),
            minutes_in in 0i64..480,
        ) {
            let role = if is_admin { UserRole::Admin } else { UserRole::Standard };
            let requester = User::new(
                "requester".to_string(),
                "requester@example.com".to_string(),
                role,
                "digest".to_string(),
                "salt".to_string(),
                UserProfile::default(),
            );
            let owner = if !has_owner {
                None
            } else if owns {
                Some(requester.uuid)
            } else {
                Some(Uuid::new_v4())
            };

            let issued_at = Utc::now();
            let mut session = Session {
                token: "t".to_string(),
                user_uuid: requester.uuid,
                issued_at,
                expires_at: issued_at + Duration::hours(8),
                logged_out_at: None,
            };
            let now = match state {
                State::Expired => session.expires_at + Duration::minutes(minutes_in),
                _ => issued_at + Duration::minutes(minutes_in),
            };
            if let State::LoggedOut = state {
                session.logged_out_at = Some(issued_at);
            }
            let session_ref = match state {
                State::Missing => None,
                _ => Some(&session),
            };

            let decision = evaluate(session_ref, Some(requester.clone()), capability, owner, now);
            let is_owner = has_owner && owns;

            match state {
                State::Missing => prop_assert!(matches!(decision, Decision::Unauthenticated)),
                State::Expired => prop_assert!(matches!(decision, Decision::SessionInvalid(InvalidReason::Expired))),
                State::LoggedOut => prop_assert!(matches!(decision, Decision::SessionInvalid(InvalidReason::LoggedOut))),
                State::Active => {
                    let allowed = match capability {
                        Capability::CreateContent | Capability::ReadContent | Capability::ReadProfile => true,
                        Capability::EditContent => is_owner,
                        Capability::DeleteContent => is_owner || is_admin,
                        Capability::DeleteUser => is_admin,
                    };
                    prop_assert_eq!(decision.is_authorized(), allowed);
                    if !allowed {
                        let expected = if capability == Capability::DeleteUser {
                            Forbidden::NotAdmin
                        } else {
                            Forbidden::NotOwner
                        };
                        prop_assert!(matches!(decision, Decision::Forbidden(f) if f == expected));
                    }
                }
            }
        }
    }
}
