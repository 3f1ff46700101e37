//! Password hashing module
//!
//! Credentials are stored as a per-user random salt plus the Argon2id output
//! computed over password and salt. Both are kept as base64 strings in
//! separate columns.
//!
//! # Security
//!
//! - Uses Argon2id with the argon2 crate's default parameters
//! - Generates a fresh random salt for each hash
//! - Compares digests in constant time

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, Output, PasswordHasher, SaltString},
    Argon2,
};

/// Salt and digest produced for one password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    /// Base64 salt (PHC salt encoding)
    pub salt: String,
    /// Base64 Argon2id output
    pub digest: String,
}

/// Hash a password under a freshly generated salt.
///
/// # Example
///
/// ```ignore
/// use askly::services::password::{hash_password, verify_password};
///
/// let stored = hash_password("my_secure_password")?;
/// assert!(verify_password("my_secure_password", &stored.salt, &stored.digest));
/// ```
pub fn hash_password(password: &str) -> Result<PasswordDigest> {
    let salt = SaltString::generate(&mut OsRng);
    let output = compute(password, &salt)?;

    Ok(PasswordDigest {
        salt: salt.as_str().to_string(),
        digest: output.to_string(),
    })
}

/// Verify a password against a stored salt and digest.
///
/// A stored value that cannot be decoded never verifies.
pub fn verify_password(password: &str, salt: &str, digest: &str) -> bool {
    let salt = match SaltString::from_b64(salt) {
        Ok(salt) => salt,
        Err(e) => {
            tracing::warn!("Stored password salt is malformed: {}", e);
            return false;
        }
    };
    let expected = match Output::b64_decode(digest) {
        Ok(expected) => expected,
        Err(e) => {
            tracing::warn!("Stored password digest is malformed: {}", e);
            return false;
        }
    };

    match compute(password, &salt) {
        // Output's PartialEq is constant-time
        Ok(actual) => actual == expected,
        Err(e) => {
            tracing::warn!("Password verification failed: {:#}", e);
            false
        }
    }
}

fn compute(password: &str, salt: &SaltString) -> Result<Output> {
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    hash.hash
        .ok_or_else(|| anyhow::anyhow!("Argon2 produced no output"))
}
