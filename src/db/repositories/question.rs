//! Question repository

use crate::models::Question;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::sync::Arc;
use uuid::Uuid;

use super::uuid_column;

/// Question repository trait
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, conn: &mut SqliteConnection, question: &Question) -> Result<Question>;

    async fn find_by_uuid(&self, conn: &mut SqliteConnection, uuid: Uuid)
        -> Result<Option<Question>>;

    /// All questions, oldest first
    async fn list_all(&self, conn: &mut SqliteConnection) -> Result<Vec<Question>>;

    /// Questions asked by one user, oldest first
    async fn list_by_owner(&self, conn: &mut SqliteConnection, owner: Uuid)
        -> Result<Vec<Question>>;

    /// Replace the content of a question. Returns `false` if it no longer exists.
    async fn update_content(
        &self,
        conn: &mut SqliteConnection,
        uuid: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Delete a question and, through the cascade, its answers
    async fn delete(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<bool>;
}

/// SQLx-based question repository implementation
pub struct SqlxQuestionRepository;

impl SqlxQuestionRepository {
    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn QuestionRepository> {
        Arc::new(Self)
    }
}

#[async_trait]
impl QuestionRepository for SqlxQuestionRepository {
    async fn create(&self, conn: &mut SqliteConnection, question: &Question) -> Result<Question> {
        let result = sqlx::query(
            r#"
            INSERT INTO questions (uuid, content, owner_uuid, created_at, edited_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(question.uuid.to_string())
        .bind(&question.content)
        .bind(question.owner_uuid.to_string())
        .bind(question.created_at)
        .bind(question.edited_at)
        .execute(&mut *conn)
        .await
        .context("Failed to create question")?;

        Ok(Question {
            id: result.last_insert_rowid(),
            ..question.clone()
        })
    }

    async fn find_by_uuid(
        &self,
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<Question>> {
        let row = sqlx::query(
            r#"
            SELECT id, uuid, content, owner_uuid, created_at, edited_at
            FROM questions
            WHERE uuid = ?
            "#,
        )
        .bind(uuid.to_string())
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get question by uuid")?;

        row.map(|row| row_to_question(&row)).transpose()
    }

    async fn list_all(&self, conn: &mut SqliteConnection) -> Result<Vec<Question>> {
        let rows = sqlx::query(
            r#"
            SELECT id, uuid, content, owner_uuid, created_at, edited_at
            FROM questions
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .context("Failed to list questions")?;

        rows.iter().map(row_to_question).collect()
    }

    async fn list_by_owner(
        &self,
        conn: &mut SqliteConnection,
        owner: Uuid,
    ) -> Result<Vec<Question>> {
        let rows = sqlx::query(
            r#"
            SELECT id, uuid, content, owner_uuid, created_at, edited_at
            FROM questions
            WHERE owner_uuid = ?
            ORDER BY id
            "#,
        )
        .bind(owner.to_string())
        .fetch_all(&mut *conn)
        .await
        .context("Failed to list questions by owner")?;

        rows.iter().map(row_to_question).collect()
    }

    async fn update_content(
        &self,
        conn: &mut SqliteConnection,
        uuid: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE questions SET content = ?, edited_at = ? WHERE uuid = ?")
            .bind(content)
            .bind(edited_at)
            .bind(uuid.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to update question")?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, conn: &mut SqliteConnection, uuid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to delete question")?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_question(row: &SqliteRow) -> Result<Question> {
    Ok(Question {
        id: row.try_get("id")?,
        uuid: uuid_column(row, "uuid")?,
        content: row.try_get("content")?,
        owner_uuid: uuid_column(row, "owner_uuid")?,
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserProfile, UserRole};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, User, User) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Vec::new();
        for name in ["alice", "bob"] {
            let user = User::new(
                name.to_string(),
                format!("{}@example.com", name),
                UserRole::Standard,
                "digest".to_string(),
                "salt".to_string(),
                UserProfile::default(),
            );
            users.push(SqlxUserRepository.create(&mut conn, &user).await.unwrap());
        }
        drop(conn);
        let bob = users.remove(1);
        let alice = users.remove(0);
        (pool, alice, bob)
    }

    #[tokio::test]
    async fn test_create_and_find_question() {
        let (pool, alice, _bob) = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = SqlxQuestionRepository;

        let question = Question::new(alice.uuid, "What is ownership?".to_string());
        let created = repo.create(&mut conn, &question).await.unwrap();
        assert!(created.id > 0);

        let found = repo.find_by_uuid(&mut conn, question.uuid).await.unwrap().unwrap();
        assert_eq!(found.owner_uuid, alice.uuid);
        assert_eq!(found.content, "What is ownership?");
        assert!(found.edited_at.is_none());
    }

    #[tokio::test]
    async fn test_list_questions() {
        let (pool, alice, bob) = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = SqlxQuestionRepository;

        repo.create(&mut conn, &Question::new(alice.uuid, "q1".to_string())).await.unwrap();
        repo.create(&mut conn, &Question::new(bob.uuid, "q2".to_string())).await.unwrap();
        repo.create(&mut conn, &Question::new(alice.uuid, "q3".to_string())).await.unwrap();

        let all = repo.list_all(&mut conn).await.unwrap();
        let contents: Vec<_> = all.iter().map(|q| q.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "q2", "q3"]);

        let alices = repo.list_by_owner(&mut conn, alice.uuid).await.unwrap();
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|q| q.owner_uuid == alice.uuid));
    }

    #[tokio::test]
    async fn test_update_and_delete_question() {
        let (pool, alice, _bob) = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = SqlxQuestionRepository;
        let question = repo
            .create(&mut conn, &Question::new(alice.uuid, "draft".to_string()))
            .await
            .unwrap();

        assert!(repo
            .update_content(&mut conn, question.uuid, "final", Utc::now())
            .await
            .unwrap());
        let found = repo.find_by_uuid(&mut conn, question.uuid).await.unwrap().unwrap();
        assert_eq!(found.content, "final");
        assert!(found.edited_at.is_some());

        assert!(repo.delete(&mut conn, question.uuid).await.unwrap());
        assert!(!repo
            .update_content(&mut conn, question.uuid, "ghost", Utc::now())
            .await
            .unwrap());
        assert!(!repo.delete(&mut conn, question.uuid).await.unwrap());
    }
}
