use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An atomic unit of lesson content. Quiz blocks gate progression through
/// the lesson; other block types are completed by viewing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentBlock {
    pub id: String,
    pub lesson_id: String,
    pub order: i32,
    pub title: String,
    pub block_type: BlockType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Video,
    Vocabulary,
    Grammar,
    Quiz,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum BlockProgressStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Per-user progress for one content block.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserBlockProgress {
    pub id: String,
    pub user_id: String,
    pub block_id: String,
    pub lesson_id: String,
    pub status: BlockProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserBlockProgress {
    pub fn new(user_id: &str, block: &ContentBlock, status: BlockProgressStatus) -> Self {
        UserBlockProgress {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            block_id: block.id.clone(),
            lesson_id: block.lesson_id.clone(),
            status,
            completed_at: None,
        }
    }
}
