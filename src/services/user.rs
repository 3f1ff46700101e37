//! User service
//!
//! Implements business logic for user management:
//! - Signup, with username/email uniqueness enforced by the store
//! - Signin, which mints and records a session
//! - Signout, which marks the session logged out exactly once
//! - Profile read and admin-only user deletion

use crate::config::AdminAccount;
use crate::db::begin_write;
use crate::db::repositories::{CreateUserError, SessionRepository, UserRepository};
use crate::models::{
    DuplicateCredential, InvalidReason, Session, SessionStatus, SignupInput, User, UserRole,
};
use crate::services::error::{AuthenticationFailure, ResourceKind, ServiceError};
use crate::services::password::{hash_password, verify_password};
use crate::services::policy::{AuthorizationPolicy, Capability};
use crate::services::token::TokenIssuer;
use anyhow::Context;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// User service for managing users and authentication
pub struct UserService {
    pool: SqlitePool,
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    issuer: TokenIssuer,
    policy: AuthorizationPolicy,
}

impl UserService {
    pub fn new(
        pool: SqlitePool,
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        issuer: TokenIssuer,
        policy: AuthorizationPolicy,
    ) -> Self {
        Self {
            pool,
            user_repo,
            session_repo,
            issuer,
            policy,
        }
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// - `DuplicateCredential` if the username or email is already taken
    /// - `Internal` for hashing or database errors
    pub async fn signup(&self, input: SignupInput) -> Result<User, ServiceError> {
        let stored = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(
            input.username,
            input.email,
            input.role.unwrap_or_default(),
            stored.digest,
            stored.salt,
            input.profile,
        );

        let mut tx = begin_write(&self.pool).await?;
        let created = match self.user_repo.create(&mut *tx, &user).await {
            Ok(created) => created,
            Err(CreateUserError::Duplicate(which)) => {
                tracing::info!("Signup rejected for {:?}", which);
                return Err(ServiceError::DuplicateCredential(which));
            }
            Err(CreateUserError::Database(e)) => return Err(ServiceError::Internal(e)),
        };
        tx.commit().await?;

        tracing::info!("User registered: {} ({})", created.username, created.uuid);
        Ok(created)
    }

    /// Create the configured administrator unless the username already exists.
    ///
    /// Returns whether an account was created. An existing user with that
    /// username is left untouched whatever its role. A free username whose
    /// email is already registered to someone else is an error.
    pub async fn ensure_admin(&self, account: &AdminAccount) -> Result<bool, ServiceError> {
        let input = SignupInput {
            username: account.username.clone(),
            email: account.email.clone(),
            password: account.password.clone(),
            role: Some(UserRole::Admin),
            ..SignupInput::default()
        };

        match self.signup(input).await {
            Ok(_) => Ok(true),
            Err(ServiceError::DuplicateCredential(DuplicateCredential::UsernameTaken)) => Ok(false),
            Err(ServiceError::DuplicateCredential(DuplicateCredential::EmailTaken)) => {
                Err(ServiceError::Internal(anyhow::anyhow!(
                    "Cannot create administrator {}: email {} belongs to another user",
                    account.username,
                    account.email
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Verify credentials and open a session
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed(UnknownUser)` if no user has this username
    /// - `AuthenticationFailed(BadPassword)` if the password does not verify
    pub async fn signin(&self, username: &str, password: &str) -> Result<Session, ServiceError> {
        // Verification is slow; it runs with no connection held
        let user = {
            let mut conn = self.pool.acquire().await?;
            self.user_repo.find_by_username(&mut conn, username).await?
        }
        .ok_or(ServiceError::AuthenticationFailed(
            AuthenticationFailure::UnknownUser,
        ))?;

        if !verify_password(password, &user.password_salt, &user.password_hash) {
            tracing::info!("Signin failed for {}: bad password", user.uuid);
            return Err(ServiceError::AuthenticationFailed(
                AuthenticationFailure::BadPassword,
            ));
        }

        let session = self.issuer.issue(&user);
        let mut tx = begin_write(&self.pool).await?;
        self.session_repo.save(&mut *tx, &session).await?;
        tx.commit().await?;

        tracing::info!("User signed in: {}", user.uuid);
        Ok(session)
    }

    /// Log a session out
    ///
    /// An unknown, expired or already logged-out token is `SignOutRestricted`,
    /// so a second logout never succeeds.
    pub async fn signout(&self, token: &str) -> Result<User, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();

        let session = match self.session_repo.find_by_token_value(&mut *tx, token).await? {
            Some(session) => session,
            None => return Err(ServiceError::SignOutRestricted),
        };

        if let SessionStatus::Invalid(reason) = session.status_at(now) {
            tracing::info!("Signout rejected for {}: {:?}", session.user_uuid, reason);
            return Err(ServiceError::SignOutRestricted);
        }

        // Conditional update; loses to a concurrent logout of the same token
        if !self
            .session_repo
            .mark_logged_out(&mut *tx, token, now)
            .await?
        {
            tracing::info!(
                "Signout rejected for {}: {:?}",
                session.user_uuid,
                InvalidReason::LoggedOut
            );
            return Err(ServiceError::SignOutRestricted);
        }

        let user = self
            .user_repo
            .find_by_uuid(&mut *tx, session.user_uuid)
            .await?
            .ok_or(ServiceError::SignOutRestricted)?;

        tx.commit().await?;

        tracing::info!("User signed out: {}", user.uuid);
        Ok(user)
    }

    /// Read a user's profile
    pub async fn profile(&self, token: &str, user_uuid: Uuid) -> Result<User, ServiceError> {
        let mut tx = self.pool.begin().await?;

        self.policy
            .require(&mut *tx, token, Capability::ReadProfile, None)
            .await?;

        let user = self
            .user_repo
            .find_by_uuid(&mut *tx, user_uuid)
            .await?
            .ok_or(ServiceError::NotFound(ResourceKind::User))?;

        tx.commit().await?;
        Ok(user)
    }

    /// Delete a user (admin only)
    ///
    /// The user's sessions, questions and answers are removed with it.
    pub async fn delete_user(&self, token: &str, user_uuid: Uuid) -> Result<User, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let admin = self
            .policy
            .require(&mut *tx, token, Capability::DeleteUser, None)
            .await?;

        let user = self
            .user_repo
            .find_by_uuid(&mut *tx, user_uuid)
            .await?
            .ok_or(ServiceError::NotFound(ResourceKind::User))?;

        if !self.user_repo.delete(&mut *tx, user_uuid).await? {
            return Err(ServiceError::NotFound(ResourceKind::User));
        }

        tx.commit().await?;

        tracing::info!("User {} deleted by admin {}", user.uuid, admin.uuid);
        Ok(user)
    }
}
