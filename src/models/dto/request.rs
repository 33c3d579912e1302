use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

/// One submitted answer. Which field is set depends on the question type;
/// anything missing or mismatched is graded as incorrect, never rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerSubmission {
    #[validate(length(min = 1))]
    pub question_id: String,

    pub selected_answer: Option<String>,

    /// Matching questions: prompt -> chosen value.
    pub matches: Option<BTreeMap<String, String>>,

    pub writing_answer: Option<String>,

    /// Client-reported seconds spent on this question.
    #[validate(range(min = 0))]
    pub time_spent: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(nested)]
    pub answers: Vec<AnswerSubmission>,

    /// Client-reported seconds spent on the whole attempt. Cross-checked
    /// against the server clock on submission.
    #[validate(range(min = 0))]
    pub time_spent: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        let request = SubmitAnswersRequest {
            answers: vec![AnswerSubmission {
                question_id: "q-1".to_string(),
                selected_answer: Some("an".to_string()),
                matches: None,
                writing_answer: None,
                time_spent: Some(15),
            }],
            time_spent: Some(120),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_time_spent_rejected() {
        let request = SubmitAnswersRequest {
            answers: vec![],
            time_spent: Some(-5),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_question_id_rejected() {
        let request = SubmitAnswersRequest {
            answers: vec![AnswerSubmission {
                question_id: String::new(),
                selected_answer: None,
                matches: None,
                writing_answer: None,
                time_spent: None,
            }],
            time_spent: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_matches_deserialize_from_json_object() {
        let json = r#"{
            "answers": [
                { "question_id": "q-1", "matches": { "big": "large", "small": "tiny" } }
            ]
        }"#;
        let request: SubmitAnswersRequest = serde_json::from_str(json).unwrap();

        let matches = request.answers[0].matches.as_ref().unwrap();
        assert_eq!(matches.get("big").map(String::as_str), Some("large"));
    }
}
