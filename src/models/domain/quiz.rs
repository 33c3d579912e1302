use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::question::Question;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub level: Option<String>,     // CEFR level, e.g. "B1"
    pub quiz_type: Option<String>, // e.g. "vocabulary", "grammar"
    pub questions: Vec<Question>,
    pub total_questions: i32,
    pub total_points: f64,
    /// Advisory time limit in seconds; not enforced server-side.
    pub time_limit: Option<i64>,
    /// Pass threshold as a percentage.
    pub pass_score: f64,
}

impl Quiz {
    pub const DEFAULT_PASS_SCORE: f64 = 70.0;

    pub fn new(title: &str, questions: Vec<Question>, pass_score: Option<f64>) -> Self {
        let total_questions = questions.len() as i32;
        let total_points = questions.iter().map(|q| q.points).sum();

        Quiz {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            level: None,
            quiz_type: None,
            questions,
            total_questions,
            total_points,
            time_limit: None,
            pass_score: pass_score.unwrap_or(Self::DEFAULT_PASS_SCORE),
        }
    }

    /// Checks the aggregate invariants: stored totals must agree with the
    /// question list, and every question must itself be well-formed.
    pub fn validate_structure(&self) -> AppResult<()> {
        if self.total_questions as usize != self.questions.len() {
            return Err(AppError::BadRequest(format!(
                "Quiz '{}' total_questions ({}) does not match question count ({})",
                self.id,
                self.total_questions,
                self.questions.len()
            )));
        }

        let computed: f64 = self.questions.iter().map(|q| q.points).sum();
        if (computed - self.total_points).abs() > f64::EPSILON {
            return Err(AppError::BadRequest(format!(
                "Quiz '{}' total_points ({}) does not match sum of question points ({})",
                self.id, self.total_points, computed
            )));
        }

        for question in &self.questions {
            question.validate_structure()?;
        }

        Ok(())
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::{AnswerOption, QuestionKind};

    fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                id: "q-1".to_string(),
                text: "Choose the correct article: ___ apple".to_string(),
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
            },
            Question {
                id: "q-2".to_string(),
                text: "The plural of 'child' is ___".to_string(),
                points: 5.0,
                kind: QuestionKind::FillBlank {
                    accepted_answers: vec!["children".to_string()],
                },
            },
        ]
    }

    #[test]
    fn new_quiz_computes_totals() {
        let quiz = Quiz::new("Articles", sample_questions(), None);

        assert_eq!(quiz.total_questions, 2);
        assert_eq!(quiz.total_points, 15.0);
        assert_eq!(quiz.pass_score, Quiz::DEFAULT_PASS_SCORE);
        assert!(quiz.validate_structure().is_ok());
    }

    #[test]
    fn validate_structure_rejects_mismatched_totals() {
        let mut quiz = Quiz::new("Articles", sample_questions(), None);
        quiz.total_questions = 5;
        assert!(quiz.validate_structure().is_err());

        let mut quiz = Quiz::new("Articles", sample_questions(), None);
        quiz.total_points = 99.0;
        assert!(quiz.validate_structure().is_err());
    }

    #[test]
    fn question_lookup_by_id() {
        let quiz = Quiz::new("Articles", sample_questions(), Some(80.0));

        assert!(quiz.question("q-2").is_some());
        assert!(quiz.question("q-404").is_none());
        assert_eq!(quiz.pass_score, 80.0);
    }
}
