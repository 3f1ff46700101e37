//! Answer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An answer to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Row identifier
    pub id: i64,
    /// Public identifier
    pub uuid: Uuid,
    /// Answer body
    pub content: String,
    /// Question this answer belongs to
    pub question_uuid: Uuid,
    /// Uuid of the user who answered; fixed at creation
    pub owner_uuid: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp
    pub edited_at: Option<DateTime<Utc>>,
}

impl Answer {
    pub fn new(owner_uuid: Uuid, question_uuid: Uuid, content: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            uuid: Uuid::new_v4(),
            content,
            question_uuid,
            owner_uuid,
            created_at: Utc::now(),
            edited_at: None,
        }
    }
}
