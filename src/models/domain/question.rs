use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// A single quiz question. The grading key lives inside `kind` and must
/// never be serialized into client-facing views (see `QuestionView`).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub points: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<AnswerOption> },
    TrueFalse { options: Vec<AnswerOption> },
    FillBlank { accepted_answers: Vec<String> },
    Matching { pairs: Vec<MatchPair> },
    /// Graded by an external writing service, carries no machine key.
    Writing,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

impl Question {
    /// Structural checks run when a quiz is created or loaded. A question
    /// that fails these cannot be graded meaningfully.
    pub fn validate_structure(&self) -> AppResult<()> {
        if self.points < 0.0 {
            return Err(AppError::BadRequest(format!(
                "Question '{}' has negative points",
                self.id
            )));
        }

        match &self.kind {
            QuestionKind::MultipleChoice { options } | QuestionKind::TrueFalse { options } => {
                if !options.iter().any(|o| o.is_correct) {
                    return Err(AppError::BadRequest(format!(
                        "Question '{}' has no option flagged correct",
                        self.id
                    )));
                }
            }
            QuestionKind::FillBlank { accepted_answers } => {
                if accepted_answers.is_empty() {
                    return Err(AppError::BadRequest(format!(
                        "Question '{}' has no accepted answers",
                        self.id
                    )));
                }
            }
            QuestionKind::Matching { pairs } => {
                if pairs.is_empty() {
                    return Err(AppError::BadRequest(format!(
                        "Question '{}' has no matching pairs",
                        self.id
                    )));
                }
            }
            QuestionKind::Writing => {}
        }

        Ok(())
    }
}
