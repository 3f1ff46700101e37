//! User model
//!
//! This module defines the User entity and related types for askly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User entity representing a registered user in the system.
///
/// The role is fixed at signup. Identity comparisons between users always go
/// through `uuid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Row identifier
    pub id: i64,
    /// Public identifier
    pub uuid: Uuid,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Password digest (argon2 output, base64)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Per-user password salt
    #[serde(skip_serializing)]
    pub password_salt: String,
    /// Optional profile details
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Optional profile details captured at signup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub about_me: Option<String>,
    pub dob: Option<String>,
    pub contact_number: Option<String>,
}

impl User {
    /// Create a new User with a fresh uuid.
    ///
    /// The password must already be hashed, see `services::password::hash_password()`.
    pub fn new(
        username: String,
        email: String,
        role: UserRole,
        password_hash: String,
        password_salt: String,
        profile: UserProfile,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            uuid: Uuid::new_v4(),
            username,
            email,
            role,
            password_hash,
            password_salt,
            profile,
            created_at: Utc::now(),
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular member
    Standard,
    /// Administrator - may delete any content and any user
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Standard
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Standard => write!(f, "standard"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(UserRole::Standard),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Which unique credential a signup collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCredential {
    UsernameTaken,
    EmailTaken,
}

/// Input for signing up a new user (before password hashing)
#[derive(Debug, Clone, Default)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// User role (optional, defaults to Standard)
    pub role: Option<UserRole>,
    pub profile: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            role,
            "digest".to_string(),
            "salt".to_string(),
            UserProfile::default(),
        )
    }

    #[test]
    fn test_user_new() {
        let u = user(UserRole::Standard);
        assert_eq!(u.id, 0);
        assert_eq!(u.username, "alice");
        assert_eq!(u.role, UserRole::Standard);
        assert!(!u.is_admin());
        assert_ne!(u.uuid, user(UserRole::Standard).uuid);
    }

    #[test]
    fn test_user_role_roundtrip() {
        for role in [UserRole::Standard, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("nonadmin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_serialization_hides_credentials() {
        let json = serde_json::to_value(user(UserRole::Admin)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_salt").is_none());
        assert_eq!(json["role"], "admin");
    }
}
