//! Question service
//!
//! Every operation runs in one transaction: the session is resolved, the
//! policy decides, and the read or mutation happens on the same connection,
//! so a concurrent logout cannot slip between the check and the write.

use crate::db::begin_write;
use crate::db::repositories::{QuestionRepository, UserRepository};
use crate::models::Question;
use crate::services::error::{ResourceKind, ServiceError};
use crate::services::policy::{AuthorizationPolicy, Capability};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Question service
pub struct QuestionService {
    pool: SqlitePool,
    question_repo: Arc<dyn QuestionRepository>,
    user_repo: Arc<dyn UserRepository>,
    policy: AuthorizationPolicy,
}

impl QuestionService {
    pub fn new(
        pool: SqlitePool,
        question_repo: Arc<dyn QuestionRepository>,
        user_repo: Arc<dyn UserRepository>,
        policy: AuthorizationPolicy,
    ) -> Self {
        Self {
            pool,
            question_repo,
            user_repo,
            policy,
        }
    }

    /// Post a question owned by the caller
    pub async fn create(&self, token: &str, content: &str) -> Result<Question, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let owner = self
            .policy
            .require(&mut *tx, token, Capability::CreateContent, None)
            .await?;

        let question = self
            .question_repo
            .create(&mut *tx, &Question::new(owner.uuid, content.to_string()))
            .await?;

        tx.commit().await?;

        tracing::info!("Question {} created by {}", question.uuid, owner.uuid);
        Ok(question)
    }

    /// All questions
    pub async fn list_all(&self, token: &str) -> Result<Vec<Question>, ServiceError> {
        let mut tx = self.pool.begin().await?;

        self.policy
            .require(&mut *tx, token, Capability::ReadContent, None)
            .await?;
        let questions = self.question_repo.list_all(&mut *tx).await?;

        tx.commit().await?;
        Ok(questions)
    }

    /// Questions asked by `user_uuid`
    pub async fn list_by_user(
        &self,
        token: &str,
        user_uuid: Uuid,
    ) -> Result<Vec<Question>, ServiceError> {
        let mut tx = self.pool.begin().await?;

        self.policy
            .require(&mut *tx, token, Capability::ReadContent, None)
            .await?;

        if self.user_repo.find_by_uuid(&mut *tx, user_uuid).await?.is_none() {
            return Err(ServiceError::NotFound(ResourceKind::User));
        }
        let questions = self.question_repo.list_by_owner(&mut *tx, user_uuid).await?;

        tx.commit().await?;
        Ok(questions)
    }

    /// Replace a question's content (owner only)
    pub async fn edit(
        &self,
        token: &str,
        question_uuid: Uuid,
        content: &str,
    ) -> Result<Question, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let question = self.question_repo.find_by_uuid(&mut *tx, question_uuid).await?;
        let editor = self
            .policy
            .require_on(
                &mut *tx,
                token,
                Capability::EditContent,
                question.as_ref().map(|q| q.owner_uuid),
                ResourceKind::Question,
            )
            .await?;
        let Some(mut question) = question else {
            return Err(ServiceError::NotFound(ResourceKind::Question));
        };

        let edited_at = Utc::now();
        if !self
            .question_repo
            .update_content(&mut *tx, question_uuid, content, edited_at)
            .await?
        {
            return Err(ServiceError::NotFound(ResourceKind::Question));
        }

        tx.commit().await?;

        question.content = content.to_string();
        question.edited_at = Some(edited_at);
        tracing::info!("Question {} edited by {}", question.uuid, editor.uuid);
        Ok(question)
    }

    /// Delete a question and its answers (owner or admin)
    pub async fn delete(&self, token: &str, question_uuid: Uuid) -> Result<Question, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let question = self.question_repo.find_by_uuid(&mut *tx, question_uuid).await?;
        let actor = self
            .policy
            .require_on(
                &mut *tx,
                token,
                Capability::DeleteContent,
                question.as_ref().map(|q| q.owner_uuid),
                ResourceKind::Question,
            )
            .await?;
        let Some(question) = question else {
            return Err(ServiceError::NotFound(ResourceKind::Question));
        };

        if !self.question_repo.delete(&mut *tx, question_uuid).await? {
            return Err(ServiceError::NotFound(ResourceKind::Question));
        }

        tx.commit().await?;

        tracing::info!("Question {} deleted by {}", question.uuid, actor.uuid);
        Ok(question)
    }
}
