use crate::models::domain::question::{AnswerOption, MatchPair, Question, QuestionKind};
use crate::models::domain::quiz_attempt::AnswerRecord;
use crate::models::dto::request::AnswerSubmission;

/// Result of grading one full answer sheet against a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedSheet {
    pub answers: Vec<AnswerRecord>,
    pub score: f64,
    pub correct_answers: i32,
}

/// Pure grading over (question definitions, submitted answers). Grading
/// never fails: unanswered questions score zero, submissions for unknown
/// question ids are dropped, malformed answers count as incorrect.
pub struct ScoringService;

impl ScoringService {
    pub fn grade(questions: &[Question], submissions: &[AnswerSubmission]) -> GradedSheet {
        let mut answers = Vec::with_capacity(questions.len());
        let mut score = 0.0;
        let mut correct_answers = 0;

        // Iterating over the quiz's questions (not the submissions) is what
        // silently drops answers for stale question ids.
        for question in questions {
            let submission = submissions.iter().find(|s| s.question_id == question.id);
            let record = Self::grade_question(question, submission);

            score += record.points_earned;
            if record.is_correct {
                correct_answers += 1;
            }
            answers.push(record);
        }

        GradedSheet {
            answers,
            score,
            correct_answers,
        }
    }

    /// Rounded percentage of `score` against `total_points`; zero when the
    /// quiz carries no points at all.
    pub fn percentage(score: f64, total_points: f64) -> f64 {
        if total_points > 0.0 {
            (score / total_points * 100.0).round()
        } else {
            0.0
        }
    }

    fn grade_question(question: &Question, submission: Option<&AnswerSubmission>) -> AnswerRecord {
        let (is_correct, points_earned) = match &question.kind {
            QuestionKind::MultipleChoice { options } | QuestionKind::TrueFalse { options } => {
                Self::grade_choice(options, submission, question.points)
            }
            QuestionKind::FillBlank { accepted_answers } => {
                Self::grade_fill_blank(accepted_answers, submission, question.points)
            }
            QuestionKind::Matching { pairs } => {
                Self::grade_matching(pairs, submission, question.points)
            }
            // Writing is scored by an external grader; record the answer
            // with zero points.
            QuestionKind::Writing => (false, 0.0),
        };

        AnswerRecord {
            question_id: question.id.clone(),
            selected_answer: submission.and_then(|s| s.selected_answer.clone()),
            matches: submission.and_then(|s| s.matches.clone()),
            writing_answer: submission.and_then(|s| s.writing_answer.clone()),
            is_correct,
            points_earned,
            time_spent: submission.and_then(|s| s.time_spent),
        }
    }

    /// Case-sensitive exact match against the flagged-correct option text.
    /// All-or-nothing points.
    fn grade_choice(
        options: &[AnswerOption],
        submission: Option<&AnswerSubmission>,
        points: f64,
    ) -> (bool, f64) {
        let selected = submission.and_then(|s| s.selected_answer.as_deref());

        let is_correct = match selected {
            Some(answer) => options.iter().any(|o| o.is_correct && o.text == answer),
            None => false,
        };

        (is_correct, if is_correct { points } else { 0.0 })
    }

    /// Trimmed, case-insensitive match against any accepted answer.
    fn grade_fill_blank(
        accepted_answers: &[String],
        submission: Option<&AnswerSubmission>,
        points: f64,
    ) -> (bool, f64) {
        let given = submission
            .and_then(|s| s.selected_answer.as_deref())
            .map(|s| s.trim().to_lowercase());

        let is_correct = match given {
            Some(answer) if !answer.is_empty() => accepted_answers
                .iter()
                .any(|accepted| accepted.trim().to_lowercase() == answer),
            _ => false,
        };

        (is_correct, if is_correct { points } else { 0.0 })
    }

    /// Partial credit: points are proportional to the number of correctly
    /// matched pairs. Submitted keys that are not prompts are ignored.
    fn grade_matching(
        pairs: &[MatchPair],
        submission: Option<&AnswerSubmission>,
        points: f64,
    ) -> (bool, f64) {
        let total_pairs = pairs.len();
        if total_pairs == 0 {
            return (false, 0.0);
        }

        let correct_pairs = match submission.and_then(|s| s.matches.as_ref()) {
            Some(matches) => pairs
                .iter()
                .filter(|pair| matches.get(&pair.left) == Some(&pair.right))
                .count(),
            None => 0,
        };

        let earned = points * correct_pairs as f64 / total_pairs as f64;
        (correct_pairs == total_pairs, earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn mc_question(id: &str, points: f64) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            points,
            kind: QuestionKind::MultipleChoice {
                options: vec![
                    AnswerOption {
                        text: "correct".to_string(),
                        is_correct: true,
                    },
                    AnswerOption {
                        text: "wrong".to_string(),
                        is_correct: false,
                    },
                ],
            },
        }
    }

    fn answer(question_id: &str, selected: &str) -> AnswerSubmission {
        AnswerSubmission {
            question_id: question_id.to_string(),
            selected_answer: Some(selected.to_string()),
            matches: None,
            writing_answer: None,
            time_spent: Some(10),
        }
    }

    fn matching_question(id: &str, points: f64) -> Question {
        Question {
            id: id.to_string(),
            text: "Match the synonyms".to_string(),
            points,
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
                    MatchPair {
                        left: "small".to_string(),
                        right: "tiny".to_string(),
                    },
                ],
            },
        }
    }

    #[test]
    fn multiple_choice_is_all_or_nothing() {
        let questions = vec![mc_question("q-1", 25.0)];

        let right = ScoringService::grade(&questions, &[answer("q-1", "correct")]);
        assert_eq!(right.answers[0].points_earned, 25.0);
        assert!(right.answers[0].is_correct);

        let wrong = ScoringService::grade(&questions, &[answer("q-1", "wrong")]);
        assert_eq!(wrong.answers[0].points_earned, 0.0);
        assert!(!wrong.answers[0].is_correct);
    }

    #[test]
    fn multiple_choice_comparison_is_case_sensitive() {
        let questions = vec![mc_question("q-1", 10.0)];
        let graded = ScoringService::grade(&questions, &[answer("q-1", "Correct")]);

        assert!(!graded.answers[0].is_correct);
    }

    #[test]
    fn fill_blank_trims_and_ignores_case() {
        let questions = vec![Question {
            id: "q-1".to_string(),
            text: "The opposite of hot is ___".to_string(),
            points: 10.0,
            kind: QuestionKind::FillBlank {
                accepted_answers: vec!["cold".to_string(), "chilly".to_string()],
            },
        }];

        let graded = ScoringService::grade(&questions, &[answer("q-1", "  CoLd ")]);
        assert!(graded.answers[0].is_correct);

        let graded = ScoringService::grade(&questions, &[answer("q-1", "warm")]);
        assert!(!graded.answers[0].is_correct);
    }

    #[test]
    fn matching_awards_partial_credit() {
        let questions = vec![matching_question("q-1", 8.0)];

        let mut matches = BTreeMap::new();
        matches.insert("big".to_string(), "large".to_string());
        matches.insert("fast".to_string(), "quick".to_string());
        matches.insert("happy".to_string(), "glad".to_string());
        matches.insert("small".to_string(), "wrong".to_string());

        let submission = AnswerSubmission {
            question_id: "q-1".to_string(),
            selected_answer: None,
            matches: Some(matches),
            writing_answer: None,
            time_spent: None,
        };

        let graded = ScoringService::grade(&questions, &[submission]);
        let record = &graded.answers[0];

        // 3 of 4 pairs: 8 * 0.75
        assert!((record.points_earned - 6.0).abs() < f64::EPSILON);
        assert!(!record.is_correct);
        assert!(record.points_earned >= 0.0 && record.points_earned <= 8.0);
    }

    #[test]
    fn matching_all_pairs_correct_is_full_credit() {
        let questions = vec![matching_question("q-1", 8.0)];

        let matches: BTreeMap<String, String> = [
            ("big", "large"),
            ("fast", "quick"),
            ("happy", "glad"),
            ("small", "tiny"),
        ]
        .iter()
        .map(|(l, r)| (l.to_string(), r.to_string()))
        .collect();

        let submission = AnswerSubmission {
            question_id: "q-1".to_string(),
            selected_answer: None,
            matches: Some(matches),
            writing_answer: None,
            time_spent: None,
        };

        let graded = ScoringService::grade(&questions, &[submission]);
        assert!(graded.answers[0].is_correct);
        assert_eq!(graded.answers[0].points_earned, 8.0);
    }

    #[test]
    fn writing_scores_zero_pending_external_grading() {
        let questions = vec![Question {
            id: "q-1".to_string(),
            text: "Describe your weekend".to_string(),
            points: 20.0,
            kind: QuestionKind::Writing,
        }];

        let submission = AnswerSubmission {
            question_id: "q-1".to_string(),
            selected_answer: None,
            matches: None,
            writing_answer: Some("I went hiking.".to_string()),
            time_spent: Some(300),
        };

        let graded = ScoringService::grade(&questions, &[submission]);
        let record = &graded.answers[0];

        assert!(!record.is_correct);
        assert_eq!(record.points_earned, 0.0);
        assert_eq!(record.writing_answer.as_deref(), Some("I went hiking."));
    }

    #[test]
    fn unanswered_question_scores_zero_without_error() {
        let questions = vec![mc_question("q-1", 25.0), mc_question("q-2", 25.0)];

        let graded = ScoringService::grade(&questions, &[answer("q-1", "correct")]);

        assert_eq!(graded.answers.len(), 2);
        assert_eq!(graded.answers[1].question_id, "q-2");
        assert!(!graded.answers[1].is_correct);
        assert_eq!(graded.answers[1].points_earned, 0.0);
        assert_eq!(graded.score, 25.0);
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let questions = vec![mc_question("q-1", 25.0)];

        let graded = ScoringService::grade(
            &questions,
            &[answer("q-1", "correct"), answer("q-stale", "correct")],
        );

        assert_eq!(graded.answers.len(), 1);
        assert_eq!(graded.score, 25.0);
        assert_eq!(graded.correct_answers, 1);
    }

    #[test]
    fn aggregate_score_sums_points_across_the_sheet() {
        // 4 multiple-choice questions worth 25 points each, 3 answered
        // correctly: score 75, percentage 75.
        let questions = vec![
            mc_question("q-1", 25.0),
            mc_question("q-2", 25.0),
            mc_question("q-3", 25.0),
            mc_question("q-4", 25.0),
        ];
        let submissions = vec![
            answer("q-1", "correct"),
            answer("q-2", "correct"),
            answer("q-3", "correct"),
            answer("q-4", "wrong"),
        ];

        let graded = ScoringService::grade(&questions, &submissions);
        assert_eq!(graded.score, 75.0);
        assert_eq!(graded.correct_answers, 3);

        let percentage = ScoringService::percentage(graded.score, 100.0);
        assert_eq!(percentage, 75.0);
        assert!(percentage >= 70.0); // passes at the default threshold
    }

    #[test]
    fn percentage_of_zero_point_quiz_is_zero() {
        assert_eq!(ScoringService::percentage(0.0, 0.0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        assert_eq!(ScoringService::percentage(2.0, 3.0), 67.0);
        assert_eq!(ScoringService::percentage(1.0, 3.0), 33.0);
    }
}
