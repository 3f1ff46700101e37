//! Shared API response types
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Answer, Question, User};

/// `{id, status}` acknowledgement for a create, edit or delete
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: String,
}

impl StatusResponse {
    pub fn new(id: Uuid, status: &str) -> Self {
        Self {
            id,
            status: status.to_string(),
        }
    }
}

/// `{id, message}` acknowledgement for signin and signout
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub message: String,
}

impl MessageResponse {
    pub fn new(id: Uuid, message: &str) -> Self {
        Self {
            id,
            message: message.to_string(),
        }
    }
}

/// Public profile of a user
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsResponse {
    pub id: Uuid,
    pub user_name: String,
    pub email_address: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub about_me: Option<String>,
    pub dob: Option<String>,
    pub contact_number: Option<String>,
}

impl From<User> for UserDetailsResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.uuid,
            user_name: user.username,
            email_address: user.email,
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            country: user.profile.country,
            about_me: user.profile.about_me,
            dob: user.profile.dob,
            contact_number: user.profile.contact_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionDetailsResponse {
    pub id: Uuid,
    pub content: String,
}

impl From<Question> for QuestionDetailsResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.uuid,
            content: question.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetailsResponse {
    pub id: Uuid,
    pub answer_content: String,
}

impl From<Answer> for AnswerDetailsResponse {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.uuid,
            answer_content: answer.content,
        }
    }
}

/// Request body carrying only content, for question create/edit and answer edit
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

/// Parse a path identifier.
///
/// A value that is not a uuid cannot name any resource; it is looked up as
/// the nil uuid so the caller still gets its session judged before `NotFound`.
pub fn parse_path_uuid(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or(Uuid::nil())
}
