use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Abandoned,
}

/// Links a block-scoped attempt to the lesson content block it gates.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockContext {
    pub block_id: String,
    pub block_progress_id: String,
}

/// One graded answer inside a completed attempt. Exactly one of
/// `selected_answer`, `matches` or `writing_answer` is set depending on
/// the question variant; an unanswered question leaves all three empty.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnswerRecord {
    pub question_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing_answer: Option<String>,
    pub is_correct: bool,
    pub points_earned: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    /// Present only for attempts started against a lesson content block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockContext>,
    pub answers: Vec<AnswerRecord>,
    pub score: f64,
    pub percentage: f64,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub time_spent: i64,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub is_passed: bool,
}

impl QuizAttempt {
    pub fn start(user_id: &str, quiz_id: &str, total_questions: i32) -> Self {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            block: None,
            answers: Vec::new(),
            score: 0.0,
            percentage: 0.0,
            total_questions,
            correct_answers: 0,
            time_spent: 0,
            status: AttemptStatus::InProgress,
            started_at: Utc::now(),
            completed_at: None,
            is_passed: false,
        }
    }

    pub fn start_for_block(
        user_id: &str,
        quiz_id: &str,
        total_questions: i32,
        block: BlockContext,
    ) -> Self {
        let mut attempt = Self::start(user_id, quiz_id, total_questions);
        attempt.block = Some(block);
        attempt
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    pub fn is_block_scoped(&self) -> bool {
        self.block.is_some()
    }
}
