use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Exam {
    pub id: String,
    pub title: String,
    /// Ordered by `ExamSection::order`; each section binds exactly one quiz.
    pub sections: Vec<ExamSection>,
    /// Advisory total time limit in seconds.
    pub total_time_limit: Option<i64>,
    pub max_score: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamSection {
    pub id: String,
    pub skill: SkillArea,
    pub quiz_id: String,
    pub order: i32,
    pub max_score: f64,
    pub time_limit: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SkillArea {
    Listening,
    Reading,
    Writing,
    Speaking,
    Grammar,
    Vocabulary,
}

impl Exam {
    pub fn validate_structure(&self) -> AppResult<()> {
        if self.sections.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Exam '{}' has no sections",
                self.id
            )));
        }

        let mut orders: Vec<i32> = self.sections.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        orders.dedup();
        if orders.len() != self.sections.len() {
            return Err(AppError::BadRequest(format!(
                "Exam '{}' has duplicate section orders",
                self.id
            )));
        }

        Ok(())
    }

    pub fn section(&self, section_id: &str) -> Option<&ExamSection> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Sections in presentation order.
    pub fn ordered_sections(&self) -> Vec<&ExamSection> {
        let mut sections: Vec<&ExamSection> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_exam() -> Exam {
        Exam {
            id: "exam-1".to_string(),
            title: "Placement Test".to_string(),
            sections: vec![
                ExamSection {
                    id: "sec-reading".to_string(),
                    skill: SkillArea::Reading,
                    quiz_id: "quiz-r".to_string(),
                    order: 2,
                    max_score: 50.0,
                    time_limit: Some(1200),
                },
                ExamSection {
                    id: "sec-listening".to_string(),
                    skill: SkillArea::Listening,
                    quiz_id: "quiz-l".to_string(),
                    order: 1,
                    max_score: 50.0,
                    time_limit: None,
                },
            ],
            total_time_limit: Some(3600),
            max_score: 100.0,
        }
    }

    #[test]
    fn sections_are_returned_in_order() {
        let exam = sample_exam();
        let ordered = exam.ordered_sections();

        assert_eq!(ordered[0].id, "sec-listening");
        assert_eq!(ordered[1].id, "sec-reading");
    }

    #[test]
    fn duplicate_orders_are_rejected() {
        let mut exam = sample_exam();
        exam.sections[0].order = 1;

        assert!(exam.validate_structure().is_err());
    }

    #[test]
    fn section_lookup_by_id() {
        let exam = sample_exam();
        assert!(exam.section("sec-reading").is_some());
        assert!(exam.section("sec-writing").is_none());
    }

    #[test]
    fn skill_area_serializes_snake_case() {
        let json = serde_json::to_string(&SkillArea::Vocabulary).unwrap();
        assert_eq!(json, "\"vocabulary\"");
    }
}
