//! Answer service

use crate::db::begin_write;
use crate::db::repositories::{AnswerRepository, QuestionRepository};
use crate::models::Answer;
use crate::services::error::{ResourceKind, ServiceError};
use crate::services::policy::{AuthorizationPolicy, Capability};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Answer service
pub struct AnswerService {
    pool: SqlitePool,
    answer_repo: Arc<dyn AnswerRepository>,
    question_repo: Arc<dyn QuestionRepository>,
    policy: AuthorizationPolicy,
}

impl AnswerService {
    pub fn new(
        pool: SqlitePool,
        answer_repo: Arc<dyn AnswerRepository>,
        question_repo: Arc<dyn QuestionRepository>,
        policy: AuthorizationPolicy,
    ) -> Self {
        Self {
            pool,
            answer_repo,
            question_repo,
            policy,
        }
    }

    /// Answer a question as the caller
    pub async fn create(
        &self,
        token: &str,
        question_uuid: Uuid,
        content: &str,
    ) -> Result<Answer, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let owner = self
            .policy
            .require(&mut *tx, token, Capability::CreateContent, None)
            .await?;

        if self
            .question_repo
            .find_by_uuid(&mut *tx, question_uuid)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(ResourceKind::Question));
        }

        let answer = self
            .answer_repo
            .create(
                &mut *tx,
                &Answer::new(owner.uuid, question_uuid, content.to_string()),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Answer {} to question {} created by {}",
            answer.uuid,
            question_uuid,
            owner.uuid
        );
        Ok(answer)
    }

    /// Replace an answer's content (owner only)
    pub async fn edit(
        &self,
        token: &str,
        answer_uuid: Uuid,
        content: &str,
    ) -> Result<Answer, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let answer = self.answer_repo.find_by_uuid(&mut *tx, answer_uuid).await?;
        let editor = self
            .policy
            .require_on(
                &mut *tx,
                token,
                Capability::EditContent,
                answer.as_ref().map(|a| a.owner_uuid),
                ResourceKind::Answer,
            )
            .await?;
        let Some(mut answer) = answer else {
            return Err(ServiceError::NotFound(ResourceKind::Answer));
        };

        let edited_at = Utc::now();
        if !self
            .answer_repo
            .update_content(&mut *tx, answer_uuid, content, edited_at)
            .await?
        {
            return Err(ServiceError::NotFound(ResourceKind::Answer));
        }

        tx.commit().await?;

        answer.content = content.to_string();
        answer.edited_at = Some(edited_at);
        tracing::info!("Answer {} edited by {}", answer.uuid, editor.uuid);
        Ok(answer)
    }

    /// Delete an answer (owner or admin)
    pub async fn delete(&self, token: &str, answer_uuid: Uuid) -> Result<Answer, ServiceError> {
        let mut tx = begin_write(&self.pool).await?;

        let answer = self.answer_repo.find_by_uuid(&mut *tx, answer_uuid).await?;
        let actor = self
            .policy
            .require_on(
                &mut *tx,
                token,
                Capability::DeleteContent,
                answer.as_ref().map(|a| a.owner_uuid),
                ResourceKind::Answer,
            )
            .await?;
        let Some(answer) = answer else {
            return Err(ServiceError::NotFound(ResourceKind::Answer));
        };

        if !self.answer_repo.delete(&mut *tx, answer_uuid).await? {
            return Err(ServiceError::NotFound(ResourceKind::Answer));
        }

        tx.commit().await?;

        tracing::info!("Answer {} deleted by {}", answer.uuid, actor.uuid);
        Ok(answer)
    }

    /// All answers to one question
    pub async fn list_for_question(
        &self,
        token: &str,
        question_uuid: Uuid,
    ) -> Result<Vec<Answer>, ServiceError> {
        let mut tx = self.pool.begin().await?;

        self.policy
            .require(&mut *tx, token, Capability::ReadContent, None)
            .await?;

        if self
            .question_repo
            .find_by_uuid(&mut *tx, question_uuid)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(ResourceKind::Question));
        }
        let answers = self
            .answer_repo
            .list_by_question(&mut *tx, question_uuid)
            .await?;

        tx.commit().await?;
        Ok(answers)
    }
}
