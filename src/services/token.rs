//! Session token issuing
//!
//! A token is the URL-safe base64 of HMAC-SHA256 keyed by a server secret
//! over the user uuid, the issue instant and 32 fresh random bytes. It is
//! unguessable without the secret and the randomness, and reveals nothing
//! about the user it belongs to. Tokens are never parsed back: the session
//! table is the only way to resolve one.

use anyhow::Result;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::AuthConfig;
use crate::models::{Session, User};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 32;

/// Mints sessions for authenticated users. Pure generation, no persistence.
#[derive(Clone)]
pub struct TokenIssuer {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer keyed by `secret`, minting sessions that live for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
        if ttl <= Duration::zero() {
            anyhow::bail!("Session TTL must be positive");
        }
        if Utc::now().checked_add_signed(ttl).is_none() {
            anyhow::bail!("Session TTL is too large: {}", ttl);
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| anyhow::anyhow!("Invalid token secret: {}", e))?;
        Ok(Self { mac, ttl })
    }

    /// Build an issuer from the auth configuration.
    ///
    /// Without a configured secret a random one is generated for this process.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = match &config.token_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                tracing::info!("No auth.token_secret configured, using a random per-process secret");
                generate_secret()
            }
        };
        let ttl = config.session_ttl().ok_or_else(|| {
            anyhow::anyhow!(
                "auth.session_ttl_hours out of range: {}",
                config.session_ttl_hours
            )
        })?;
        Self::new(&secret, ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a session for `user` starting now
    pub fn issue(&self, user: &User) -> Session {
        self.issue_at(user, Utc::now())
    }

    /// Issue a session for `user` starting at `now`
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Session {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut mac = self.mac.clone();
        mac.update(user.uuid.as_bytes());
        mac.update(&now.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
        mac.update(&nonce);
        let token = data_encoding::BASE64URL_NOPAD.encode(&mac.finalize().into_bytes());

        Session {
            token,
            user_uuid: user.uuid,
            issued_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            logged_out_at: None,
        }
    }
}

/// Random 32-byte secret
pub fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserProfile, UserRole};
    use std::collections::HashSet;

    fn user() -> User {
        User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            UserRole::Standard,
            "digest".to_string(),
            "salt".to_string(),
            UserProfile::default(),
        )
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", Duration::hours(8)).unwrap()
    }

    #[test]
    fn test_issue_sets_timestamps() {
        let u = user();
        let now = Utc::now();
        let session = issuer().issue_at(&u, now);

        assert_eq!(session.user_uuid, u.uuid);
        assert_eq!(session.issued_at, now);
        assert_eq!(session.expires_at, now + Duration::hours(8));
        assert!(session.expires_at > session.issued_at);
        assert!(session.logged_out_at.is_none());
    }

    #[test]
    fn test_tokens_are_unique_even_at_same_instant() {
        let u = user();
        let issuer = issuer();
        let now = Utc::now();

        let tokens: HashSet<String> = (0..100).map(|_| issuer.issue_at(&u, now).token).collect();
        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_token_does_not_reveal_user() {
        let u = user();
        let token = issuer().issue(&u).token;

        assert!(!token.contains(&u.uuid.to_string()));
        assert!(!token.contains(&u.uuid.simple().to_string()));
        assert!(!token.contains("alice"));
        // 32 bytes of HMAC output, unpadded url-safe base64
        assert_eq!(token.len(), 43);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        assert!(TokenIssuer::new(b"s", Duration::zero()).is_err());
        assert!(TokenIssuer::new(b"s", Duration::hours(-1)).is_err());
    }

    #[test]
    fn test_from_config_uses_ttl() {
        let config = AuthConfig {
            session_ttl_hours: 2,
            ..AuthConfig::default()
        };
        let issuer = TokenIssuer::from_config(&config).unwrap();
        assert_eq!(issuer.ttl(), Duration::hours(2));
    }

    #[test]
    fn test_rejects_overflowing_ttl() {
        let config = AuthConfig {
            session_ttl_hours: 5_000_000_000,
            ..AuthConfig::default()
        };
        assert!(TokenIssuer::from_config(&config).is_err());

        let config = AuthConfig {
            session_ttl_hours: i64::MAX,
            ..AuthConfig::default()
        };
        assert!(TokenIssuer::from_config(&config).is_err());
    }
}
