//! Question model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question posted by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Row identifier
    pub id: i64,
    /// Public identifier
    pub uuid: Uuid,
    /// Question body
    pub content: String,
    /// Uuid of the user who asked; fixed at creation
    pub owner_uuid: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp
    pub edited_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Build a new question owned by `owner_uuid` with a fresh uuid.
    pub fn new(owner_uuid: Uuid, content: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            uuid: Uuid::new_v4(),
            content,
            owner_uuid,
            created_at: Utc::now(),
            edited_at: None,
        }
    }
}
