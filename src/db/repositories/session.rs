//! Session repository
//!
//! The registry is a plain store: it records issued sessions, resolves a
//! token back to its record and stamps logout. It makes no validity
//! judgment of its own.

use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::sync::Arc;

use super::uuid_column;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a freshly issued session
    async fn save(&self, conn: &mut SqliteConnection, session: &Session) -> Result<()>;

    /// Resolve a token value to its session
    async fn find_by_token_value(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<Session>>;

    /// Stamp `logged_out_at` on a session that has not been logged out yet.
    ///
    /// Returns `false` when no row changed, i.e. the token is unknown or the
    /// session was already logged out.
    async fn mark_logged_out(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository;

impl SqlxSessionRepository {
    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn SessionRepository> {
        Arc::new(Self)
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn save(&self, conn: &mut SqliteConnection, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_uuid, issued_at, expires_at, logged_out_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_uuid.to_string())
        .bind(session.issued_at)
        .bind(session.expires_at)
        .bind(session.logged_out_at)
        .execute(&mut *conn)
        .await
        .context("Failed to save session")?;

        Ok(())
    }

    async fn find_by_token_value(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT token, user_uuid, issued_at, expires_at, logged_out_at
            FROM sessions
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get session by token")?;

        row.map(|row| row_to_session(&row)).transpose()
    }

    async fn mark_logged_out(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET logged_out_at = ? WHERE token = ? AND logged_out_at IS NULL",
        )
        .bind(at)
        .bind(token)
        .execute(&mut *conn)
        .await
        .context("Failed to mark session logged out")?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_session(row: &SqliteRow) -> Result<Session> {
    Ok(Session {
        token: row.try_get("token")?,
        user_uuid: uuid_column(row, "user_uuid")?,
        issued_at: row.try_get("issued_at")?,
        expires_at: row.try_get("expires_at")?,
        logged_out_at: row.try_get("logged_out_at")?,
    })
}
