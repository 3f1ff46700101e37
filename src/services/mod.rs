//! Services layer - Business logic
//!
//! This module contains the session and authorization core and the
//! resource services built on it:
//! - Password hashing and token issuing
//! - The authorization policy engine every protected call goes through
//! - User, question and answer services, each operation in one transaction

pub mod answer;
pub mod error;
pub mod password;
pub mod policy;
pub mod question;
pub mod token;
pub mod user;

pub use answer::AnswerService;
pub use error::{AuthenticationFailure, AuthorizationFailure, ResourceKind, ServiceError};
pub use password::{hash_password, verify_password, PasswordDigest};
pub use policy::{AuthorizationPolicy, Capability, Decision, Forbidden};
pub use question::QuestionService;
pub use token::TokenIssuer;
pub use user::UserService;

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::db::repositories::{
    SqlxAnswerRepository, SqlxQuestionRepository, SqlxSessionRepository, SqlxUserRepository,
};

/// The resource services wired to one pool and one token issuer
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub questions: Arc<QuestionService>,
    pub answers: Arc<AnswerService>,
}

impl Services {
    pub fn new(pool: SqlitePool, issuer: TokenIssuer) -> Self {
        let user_repo = SqlxUserRepository::boxed();
        let session_repo = SqlxSessionRepository::boxed();
        let question_repo = SqlxQuestionRepository::boxed();
        let answer_repo = SqlxAnswerRepository::boxed();
        let policy = AuthorizationPolicy::new(session_repo.clone(), user_repo.clone());

        Self {
            users: Arc::new(UserService::new(
                pool.clone(),
                user_repo.clone(),
                session_repo,
                issuer,
                policy.clone(),
            )),
            questions: Arc::new(QuestionService::new(
                pool.clone(),
                question_repo.clone(),
                user_repo.clone(),
                policy.clone(),
            )),
            answers: Arc::new(AnswerService::new(pool, answer_repo, question_repo, policy)),
        }
    }
}
