//! User repository
//!
//! The credential store. Username and email uniqueness is enforced by the
//! table's UNIQUE constraints, and a violation is reported as the credential
//! that collided, so concurrent signups cannot both win.

use crate::models::{DuplicateCredential, User, UserProfile, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::uuid_column;

/// Failure to insert a new user
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("duplicate credential: {0:?}")]
    Duplicate(DuplicateCredential),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, returning it with its row id
    async fn create(
        &self,
        conn: &mut SqliteConnection,
        user: &User,
    ) -> std::result::Result<User, CreateUserError>;

    async fn find_by_username(
        &self,
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>>;

    async fn find_by_email(&self, conn: &mut SqliteConnection, email: &str) -> Result<Option<User>>;

    async fn find_by_uuid(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<Option<User>>;

    /// Delete a user; sessions and content go with it through cascades
    async fn delete(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<bool>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository;

impl SqlxUserRepository {
    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn UserRepository> {
        Arc::new(Self)
    }
}

const USER_COLUMNS: &str = "id, uuid, username, email, role, password_hash, password_salt, \
     first_name, last_name, country, about_me, dob, contact_number, created_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(
        &self,
        conn: &mut SqliteConnection,
        user: &User,
    ) -> std::result::Result<User, CreateUserError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (uuid, username, email, role, password_hash, password_salt,
                               first_name, last_name, country, about_me, dob, contact_number,
                               created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.uuid.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.to_string())
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.profile.country)
        .bind(&user.profile.about_me)
        .bind(&user.profile.dob)
        .bind(&user.profile.contact_number)
        .bind(user.created_at)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(done) => Ok(User {
                id: done.last_insert_rowid(),
                ..user.clone()
            }),
            Err(e) => match duplicate_credential(&e) {
                Some(which) => Err(CreateUserError::Duplicate(which)),
                None => Err(CreateUserError::Database(
                    anyhow::Error::new(e).context("Failed to create user"),
                )),
            },
        }
    }

    async fn find_by_username(
        &self,
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to get user by username")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn find_by_email(&self, conn: &mut SqliteConnection, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to get user by email")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn find_by_uuid(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE uuid = ?", USER_COLUMNS))
            .bind(uuid.to_string())
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to get user by uuid")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn delete(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected() == 1)
    }
}

/// Map a UNIQUE violation on username/email to the credential it hit.
fn duplicate_credential(err: &sqlx::Error) -> Option<DuplicateCredential> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    // SQLite reports "UNIQUE constraint failed: users.<column>"
    let message = db_err.message();
    if message.contains("users.username") {
        Some(DuplicateCredential::UsernameTaken)
    } else if message.contains("users.email") {
        Some(DuplicateCredential::EmailTaken)
    } else {
        None
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let role_str: String = row.try_get("role")?;
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.try_get("id")?,
        uuid: uuid_column(row, "uuid")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
        profile: UserProfile {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            country: row.try_get("country")?,
            about_me: row.try_get("about_me")?,
            dob: row.try_get("dob")?,
            contact_number: row.try_get("contact_number")?,
        },
        created_at: row.try_get("created_at")?,
    })
}
