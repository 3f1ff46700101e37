//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for a specific entity.
//!
//! Every method takes the connection to run on, so a caller can resolve a
//! session, decide, and mutate inside one transaction.

pub mod answer;
pub mod question;
pub mod session;
pub mod user;

pub use answer::{AnswerRepository, SqlxAnswerRepository};
pub use question::{QuestionRepository, SqlxQuestionRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{CreateUserError, SqlxUserRepository, UserRepository};

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Read a TEXT column holding a uuid
pub(crate) fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).with_context(|| format!("Invalid uuid in column {}: {}", column, raw))
}
