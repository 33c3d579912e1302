use serde::Serialize;

use crate::models::domain::exam::{ExamSection, SkillArea};
use crate::models::domain::question::{Question, QuestionKind};

/// Uniform response envelope for all attempt endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            code: 200,
            message: "success".to_string(),
            data,
        }
    }

    pub fn created(data: T) -> Self {
        ApiResponse {
            code: 201,
            message: "created".to_string(),
            data,
        }
    }
}

/// Client-facing view of a question with every grading key stripped.
/// Matching questions expose prompts and a sorted choice list so the
/// original pair order leaks nothing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub points: f64,
    #[serde(flatten)]
    pub detail: QuestionViewDetail,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionViewDetail {
    MultipleChoice { options: Vec<String> },
    TrueFalse { options: Vec<String> },
    FillBlank,
    Matching { prompts: Vec<String>, choices: Vec<String> },
    Writing,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        let detail = match &question.kind {
            QuestionKind::MultipleChoice { options } => QuestionViewDetail::MultipleChoice {
                options: options.iter().map(|o| o.text.clone()).collect(),
            },
            QuestionKind::TrueFalse { options } => QuestionViewDetail::TrueFalse {
                options: options.iter().map(|o| o.text.clone()).collect(),
            },
            QuestionKind::FillBlank { .. } => QuestionViewDetail::FillBlank,
            QuestionKind::Matching { pairs } => {
                let prompts = pairs.iter().map(|p| p.left.clone()).collect();
                let mut choices: Vec<String> = pairs.iter().map(|p| p.right.clone()).collect();
                choices.sort();
                QuestionViewDetail::Matching { prompts, choices }
            }
            QuestionKind::Writing => QuestionViewDetail::Writing,
        };

        QuestionView {
            id: question.id.clone(),
            text: question.text.clone(),
            points: question.points,
            detail,
        }
    }
}

/// Questions for one exam section, ready to present to the client.
#[derive(Debug, Serialize)]
pub struct SectionQuestionsView {
    pub section_id: String,
    pub skill: SkillArea,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    pub questions: Vec<QuestionView>,
}

impl SectionQuestionsView {
    pub fn new(section: &ExamSection, questions: &[Question]) -> Self {
        SectionQuestionsView {
            section_id: section.id.clone(),
            skill: section.skill,
            time_limit: section.time_limit,
            questions: questions.iter().map(QuestionView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::{AnswerOption, MatchPair};

    #[test]
    fn multiple_choice_view_drops_correct_flags() {
        let question = Question {
            id: "q-1".to_string(),
            text: "Pick one".to_string(),
            points: 10.0,
            kind: QuestionKind::MultipleChoice {
                options: vec![
                    AnswerOption {
                        text: "an".to_string(),
                        is_correct: true,
                    },
                    AnswerOption {
                        text: "a".to_string(),
                        is_correct: false,
                    },
                ],
            },
        };

        let view = QuestionView::from(&question);
        let json = serde_json::to_string(&view).unwrap();

        assert!(!json.contains("is_correct"));
        assert!(json.contains("\"an\""));
    }

    #[test]
    fn fill_blank_view_drops_accepted_answers() {
        let question = Question {
            id: "q-2".to_string(),
            text: "The sky is ___".to_string(),
            points: 5.0,
            kind: QuestionKind::FillBlank {
                accepted_answers: vec!["blue".to_string()],
            },
        };

        let json = serde_json::to_string(&QuestionView::from(&question)).unwrap();

        assert!(!json.contains("accepted_answers"));
        assert!(!json.contains("blue"));
    }

    #[test]
    fn matching_view_separates_prompts_from_sorted_choices() {
        let question = Question {
            id: "q-3".to_string(),
            text: "Match the synonyms".to_string(),
            points: 8.0,
            kind: QuestionKind::Matching {
                pairs: vec![
                    MatchPair {
                        left: "big".to_string(),
                        right: "large".to_string(),
                    },
                    MatchPair {
                        left: "fast".to_string(),
                        right: "quick".to_string(),
                    },
                    MatchPair {
                        left: "happy".to_string(),
                        right: "glad".to_string(),
                    },
                ],
            },
        };

        let view = QuestionView::from(&question);
        match &view.detail {
            QuestionViewDetail::Matching { prompts, choices } => {
                assert_eq!(prompts, &["big", "fast", "happy"]);
                // Sorted, so positional alignment with prompts is broken.
                assert_eq!(choices, &["glad", "large", "quick"]);
            }
            other => panic!("expected matching view, got {:?}", other),
        }

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("pairs"));
    }

    #[test]
    fn envelope_carries_code_message_data() {
        let response = ApiResponse::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["code"], 200);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"][2], 3);
    }
}
