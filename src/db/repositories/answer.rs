//! Answer repository

use crate::models::Answer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::sync::Arc;
use uuid::Uuid;

use super::uuid_column;

/// Answer repository trait
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn create(&self, conn: &mut SqliteConnection, answer: &Answer) -> Result<Answer>;

    async fn find_by_uuid(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<Option<Answer>>;

    /// Answers to one question, oldest first
    async fn list_by_question(
        &self,
        conn: &mut SqliteConnection,
        question: Uuid,
    ) -> Result<Vec<Answer>>;

    /// Replace the content of an answer. Returns `false` if it no longer exists.
    async fn update_content(
        &self,
        conn: &mut SqliteConnection,
        uuid: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn delete(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<bool>;
}

/// SQLx-based answer repository implementation
pub struct SqlxAnswerRepository;

impl SqlxAnswerRepository {
    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn AnswerRepository> {
        Arc::new(Self)
    }
}

const ANSWER_COLUMNS: &str = "id, uuid, content, question_uuid, owner_uuid, created_at, edited_at";

#[async_trait]
impl AnswerRepository for SqlxAnswerRepository {
    async fn create(&self, conn: &mut SqliteConnection, answer: &Answer) -> Result<Answer> {
        let result = sqlx::query(
            r#"
            INSERT INTO answers (uuid, content, question_uuid, owner_uuid, created_at, edited_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(answer.uuid.to_string())
        .bind(&answer.content)
        .bind(answer.question_uuid.to_string())
        .bind(answer.owner_uuid.to_string())
        .bind(answer.created_at)
        .bind(answer.edited_at)
        .execute(&mut *conn)
        .await
        .context("Failed to create answer")?;

        Ok(Answer {
            id: result.last_insert_rowid(),
            ..answer.clone()
        })
    }

    async fn find_by_uuid(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<Option<Answer>> {
        let row = sqlx::query(&format!("SELECT {} FROM answers WHERE uuid = ?", ANSWER_COLUMNS))
            .bind(uuid.to_string())
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to get answer by uuid")?;

        row.map(|row| row_to_answer(&row)).transpose()
    }

    async fn list_by_question(
        &self,
        conn: &mut SqliteConnection,
        question: Uuid,
    ) -> Result<Vec<Answer>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM answers WHERE question_uuid = ? ORDER BY id",
            ANSWER_COLUMNS
        ))
        .bind(question.to_string())
        .fetch_all(&mut *conn)
        .await
        .context("Failed to list answers for question")?;

        rows.iter().map(row_to_answer).collect()
    }

    async fn update_content(
        &self,
        conn: &mut SqliteConnection,
        uuid: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE answers SET content = ?, edited_at = ? WHERE uuid = ?")
            .bind(content)
            .bind(edited_at)
            .bind(uuid.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to update answer")?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM answers WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to delete answer")?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_answer(row: &SqliteRow) -> Result<Answer> {
    Ok(Answer {
        id: row.try_get("id")?,
        uuid: uuid_column(row, "uuid")?,
        content: row.try_get("content")?,
        question_uuid: uuid_column(row, "question_uuid")?,
        owner_uuid: uuid_column(row, "owner_uuid")?,
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        QuestionRepository, SqlxQuestionRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Question, User, UserProfile, UserRole};

    #[tokio::test]
    async fn test_answer_lifecycle() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let mut conn = pool.acquire().await.unwrap();

        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            UserRole::Standard,
            "digest".to_string(),
            "salt".to_string(),
            UserProfile::default(),
        );
        let user = SqlxUserRepository.create(&mut conn, &user).await.unwrap();
        let question = SqlxQuestionRepository
            .create(&mut conn, &Question::new(user.uuid, "why?".to_string()))
            .await
            .unwrap();

        let repo = SqlxAnswerRepository;
        let first = repo
            .create(&mut conn, &Answer::new(user.uuid, question.uuid, "because".to_string()))
            .await
            .unwrap();
        repo.create(&mut conn, &Answer::new(user.uuid, question.uuid, "also".to_string()))
            .await
            .unwrap();

        let listed = repo.list_by_question(&mut conn, question.uuid).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].uuid, first.uuid);

        assert!(repo
            .update_content(&mut conn, first.uuid, "edited", Utc::now())
            .await
            .unwrap());
        let found = repo.find_by_uuid(&mut conn, first.uuid).await.unwrap().unwrap();
        assert_eq!(found.content, "edited");
        assert_eq!(found.question_uuid, question.uuid);

        assert!(repo.delete(&mut conn, first.uuid).await.unwrap());
        assert!(repo.find_by_uuid(&mut conn, first.uuid).await.unwrap().is_none());

        // Deleting the question takes the remaining answer with it
        SqlxQuestionRepository.delete(&mut conn, question.uuid).await.unwrap();
        assert!(repo.list_by_question(&mut conn, question.uuid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_answer_requires_existing_question() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            UserRole::Standard,
            "digest".to_string(),
            "salt".to_string(),
            UserProfile::default(),
        );
        let user = SqlxUserRepository.create(&mut conn, &user).await.unwrap();

        let orphan = Answer::new(user.uuid, Uuid::new_v4(), "lost".to_string());
        assert!(SqlxAnswerRepository.create(&mut conn, &orphan).await.is_err());
    }
}
