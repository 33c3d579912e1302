use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::exam::Exam;
use crate::models::domain::quiz_attempt::AttemptStatus;

/// Result of one exam section, appended as the user works through the exam.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SectionResult {
    pub section_id: String,
    pub quiz_attempt_id: String,
    pub status: AttemptStatus,
    pub time_spent: i64,
    pub score: f64,
    pub percentage: f64,
    pub max_score: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamAttempt {
    pub id: String,
    pub exam_id: String,
    pub user_id: String,
    /// Sparse while in progress; one entry per attempted section.
    pub sections: Vec<SectionResult>,
    pub status: AttemptStatus,
    pub total_score: f64,
    pub total_percentage: f64,
    pub total_time_spent: i64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic-lock counter; section writes are conditional on the
    /// version they read and bump it on success.
    #[serde(default)]
    pub version: i64,
}

impl ExamAttempt {
    pub fn start(user_id: &str, exam_id: &str) -> Self {
        ExamAttempt {
            id: Uuid::new_v4().to_string(),
            exam_id: exam_id.to_string(),
            user_id: user_id.to_string(),
            sections: Vec::new(),
            status: AttemptStatus::InProgress,
            total_score: 0.0,
            total_percentage: 0.0,
            total_time_spent: 0,
            started_at: Utc::now(),
            completed_at: None,
            version: 0,
        }
    }

    /// Replaces an existing entry for the same section or appends a new one,
    /// then refreshes the aggregate totals.
    pub fn record_section(&mut self, result: SectionResult) {
        match self
            .sections
            .iter_mut()
            .find(|s| s.section_id == result.section_id)
        {
            Some(existing) => *existing = result,
            None => self.sections.push(result),
        }
        self.recompute_totals();
    }

    /// Point-weighted totals over completed sections only. Sections not yet
    /// attempted are excluded from the denominator.
    pub fn recompute_totals(&mut self) {
        let completed: Vec<&SectionResult> = self
            .sections
            .iter()
            .filter(|s| s.status == AttemptStatus::Completed)
            .collect();

        self.total_score = completed.iter().map(|s| s.score).sum();
        self.total_time_spent = completed.iter().map(|s| s.time_spent).sum();

        let max: f64 = completed.iter().map(|s| s.max_score).sum();
        self.total_percentage = if max > 0.0 {
            (self.total_score / max * 100.0).round()
        } else {
            0.0
        };
    }

    /// Section ids defined on the exam that have no completed result yet.
    pub fn missing_sections(&self, exam: &Exam) -> Vec<String> {
        exam.ordered_sections()
            .into_iter()
            .filter(|section| {
                !self.sections.iter().any(|s| {
                    s.section_id == section.id && s.status == AttemptStatus::Completed
                })
            })
            .map(|section| section.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::exam::{ExamSection, SkillArea};

    fn two_section_exam() -> Exam {
        Exam {
            id: "exam-1".to_string(),
            title: "Placement Test".to_string(),
            sections: vec![
                ExamSection {
                    id: "sec-1".to_string(),
                    skill: SkillArea::Listening,
                    quiz_id: "quiz-1".to_string(),
                    order: 1,
                    max_score: 50.0,
                    time_limit: None,
                },
                ExamSection {
                    id: "sec-2".to_string(),
                    skill: SkillArea::Reading,
                    quiz_id: "quiz-2".to_string(),
                    order: 2,
                    max_score: 50.0,
                    time_limit: None,
                },
            ],
            total_time_limit: None,
            max_score: 100.0,
        }
    }

    fn completed_section(id: &str, score: f64, max_score: f64) -> SectionResult {
        SectionResult {
            section_id: id.to_string(),
            quiz_attempt_id: format!("attempt-{id}"),
            status: AttemptStatus::Completed,
            time_spent: 300,
            score,
            percentage: (score / max_score * 100.0).round(),
            max_score,
        }
    }

    #[test]
    fn totals_are_point_weighted_over_completed_sections() {
        let mut attempt = ExamAttempt::start("user-1", "exam-1");
        attempt.record_section(completed_section("sec-1", 40.0, 50.0));

        // Only one of two sections attempted: denominator is 50, not 100.
        assert_eq!(attempt.total_score, 40.0);
        assert_eq!(attempt.total_percentage, 80.0);

        attempt.record_section(completed_section("sec-2", 30.0, 50.0));
        assert_eq!(attempt.total_score, 70.0);
        assert_eq!(attempt.total_percentage, 70.0);
        assert_eq!(attempt.total_time_spent, 600);
    }

    #[test]
    fn unequal_section_weights_use_points_not_averages() {
        let mut attempt = ExamAttempt::start("user-1", "exam-1");
        attempt.record_section(completed_section("sec-1", 10.0, 20.0)); // 50%
        attempt.record_section(completed_section("sec-2", 80.0, 80.0)); // 100%

        // Point-weighted: 90/100 = 90%, not the 75% a plain average would give.
        assert_eq!(attempt.total_percentage, 90.0);
    }

    #[test]
    fn resubmitting_a_section_replaces_the_entry() {
        let mut attempt = ExamAttempt::start("user-1", "exam-1");
        attempt.record_section(completed_section("sec-1", 20.0, 50.0));
        attempt.record_section(completed_section("sec-1", 45.0, 50.0));

        assert_eq!(attempt.sections.len(), 1);
        assert_eq!(attempt.total_score, 45.0);
    }

    #[test]
    fn missing_sections_lists_unattempted_ids() {
        let exam = two_section_exam();
        let mut attempt = ExamAttempt::start("user-1", "exam-1");

        assert_eq!(attempt.missing_sections(&exam), vec!["sec-1", "sec-2"]);

        attempt.record_section(completed_section("sec-1", 40.0, 50.0));
        assert_eq!(attempt.missing_sections(&exam), vec!["sec-2"]);

        attempt.record_section(completed_section("sec-2", 35.0, 50.0));
        assert!(attempt.missing_sections(&exam).is_empty());
    }
}
