use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        AttemptStatus, Exam, ExamAttempt, ExamSection, Quiz, QuizAttempt, SectionResult,
    },
    models::dto::request::SubmitAnswersRequest,
    models::dto::response::SectionQuestionsView,
    repositories::{
        ExamAttemptRepository, ExamRepository, QuizAttemptRepository, QuizRepository,
    },
    services::quiz_attempt_service::checked_time_spent,
    services::scoring_service::ScoringService,
};

/// Retries for the optimistic section write before giving up.
const SECTION_WRITE_RETRIES: usize = 3;

pub struct ExamAttemptService {
    exam_repository: Arc<dyn ExamRepository>,
    exam_attempt_repository: Arc<dyn ExamAttemptRepository>,
    quiz_repository: Arc<dyn QuizRepository>,
    quiz_attempt_repository: Arc<dyn QuizAttemptRepository>,
}

impl ExamAttemptService {
    pub fn new(
        exam_repository: Arc<dyn ExamRepository>,
        exam_attempt_repository: Arc<dyn ExamAttemptRepository>,
        quiz_repository: Arc<dyn QuizRepository>,
        quiz_attempt_repository: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            exam_repository,
            exam_attempt_repository,
            quiz_repository,
            quiz_attempt_repository,
        }
    }

    pub async fn start_exam(&self, exam_id: &str, user_id: &str) -> AppResult<ExamAttempt> {
        let exam = self.load_exam(exam_id).await?;

        let attempt = ExamAttempt::start(user_id, &exam.id);
        self.exam_attempt_repository.create(attempt).await
    }

    /// Sanitized questions for one section. Correct-answer keys never reach
    /// the client before submission.
    pub async fn get_section_questions(
        &self,
        attempt_id: &str,
        section_id: &str,
        user_id: &str,
    ) -> AppResult<SectionQuestionsView> {
        let attempt = self.load_owned_attempt(attempt_id, user_id).await?;
        let exam = self.load_exam(&attempt.exam_id).await?;
        let section = Self::find_section(&exam, section_id)?;
        let quiz = self.load_quiz(&section.quiz_id).await?;

        Ok(SectionQuestionsView::new(section, &quiz.questions))
    }

    /// Grades one section and folds the result into the exam attempt. The
    /// section's quiz attempt is stored alongside for review; totals are
    /// point-weighted over completed sections.
    pub async fn submit_section(
        &self,
        attempt_id: &str,
        section_id: &str,
        user_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<ExamAttempt> {
        request.validate()?;

        let mut attempt = self.load_owned_attempt(attempt_id, user_id).await?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(AppError::InvalidState(format!(
                "Exam attempt '{}' is no longer in progress",
                attempt_id
            )));
        }

        let exam = self.load_exam(&attempt.exam_id).await?;
        let section = Self::find_section(&exam, section_id)?;
        let quiz = self.load_quiz(&section.quiz_id).await?;

        let graded = ScoringService::grade(&quiz.questions, &request.answers);
        let percentage = ScoringService::percentage(graded.score, quiz.total_points);
        let ratio = if quiz.total_points > 0.0 {
            graded.score / quiz.total_points
        } else {
            0.0
        };

        let completed_at = Utc::now();
        let time_spent = checked_time_spent(
            attempt_id,
            request.time_spent,
            (completed_at - attempt.started_at).num_seconds(),
        );

        // Persist the raw quiz attempt for per-question review.
        let mut quiz_attempt = QuizAttempt::start(user_id, &quiz.id, quiz.total_questions);
        quiz_attempt.answers = graded.answers;
        quiz_attempt.score = graded.score;
        quiz_attempt.percentage = percentage;
        quiz_attempt.correct_answers = graded.correct_answers;
        quiz_attempt.time_spent = time_spent;
        quiz_attempt.status = AttemptStatus::Completed;
        quiz_attempt.completed_at = Some(completed_at);
        quiz_attempt.is_passed = percentage >= quiz.pass_score;
        let quiz_attempt = self.quiz_attempt_repository.create(quiz_attempt).await?;

        // Section scores are expressed on the section's max_score scale so
        // exam totals weight sections by their defined points.
        let result = SectionResult {
            section_id: section.id.clone(),
            quiz_attempt_id: quiz_attempt.id,
            status: AttemptStatus::Completed,
            time_spent,
            score: ratio * section.max_score,
            percentage,
            max_score: section.max_score,
        };

        // The write is version-conditional; a lost race against a submit
        // for another section is replayed on top of the fresh state.
        for _ in 0..SECTION_WRITE_RETRIES {
            attempt.record_section(result.clone());

            match self.exam_attempt_repository.update_sections(&attempt).await? {
                Some(updated) => return Ok(updated),
                None => {
                    attempt = self.load_owned_attempt(attempt_id, user_id).await?;
                    if attempt.status != AttemptStatus::InProgress {
                        return Err(AppError::InvalidState(format!(
                            "Exam attempt '{}' was completed concurrently",
                            attempt_id
                        )));
                    }
                }
            }
        }

        Err(AppError::DatabaseError(format!(
            "Persistent write contention on exam attempt '{}'",
            attempt_id
        )))
    }

    /// Finalizes the exam once every section is completed. Idempotent: a
    /// second call on a completed attempt returns the persisted result
    /// without re-scoring.
    pub async fn complete_exam(&self, attempt_id: &str, user_id: &str) -> AppResult<ExamAttempt> {
        let attempt = self.load_owned_attempt(attempt_id, user_id).await?;

        if attempt.status == AttemptStatus::Completed {
            return Ok(attempt);
        }

        let exam = self.load_exam(&attempt.exam_id).await?;
        let missing = attempt.missing_sections(&exam);
        if !missing.is_empty() {
            return Err(AppError::IncompleteSections(missing));
        }

        match self
            .exam_attempt_repository
            .complete_in_progress(attempt_id, Utc::now())
            .await?
        {
            Some(completed) => Ok(completed),
            // Lost a race against another complete call; the attempt is
            // completed either way, so return what is stored.
            None => self.load_owned_attempt(attempt_id, user_id).await,
        }
    }

    pub async fn get_attempt(&self, attempt_id: &str, user_id: &str) -> AppResult<ExamAttempt> {
        self.load_owned_attempt(attempt_id, user_id).await
    }

    async fn load_owned_attempt(
        &self,
        attempt_id: &str,
        user_id: &str,
    ) -> AppResult<ExamAttempt> {
        let attempt = self
            .exam_attempt_repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Exam attempt with id '{}' not found", attempt_id))
            })?;

        if attempt.user_id != user_id {
            return Err(AppError::Unauthorized(
                "Exam attempt belongs to a different user".to_string(),
            ));
        }

        Ok(attempt)
    }

    async fn load_exam(&self, exam_id: &str) -> AppResult<Exam> {
        let exam = self
            .exam_repository
            .find_by_id(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exam with id '{}' not found", exam_id)))?;
        exam.validate_structure()?;
        Ok(exam)
    }

    async fn load_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        let quiz = self
            .quiz_repository
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;
        quiz.validate_structure()?;
        Ok(quiz)
    }

    fn find_section<'a>(exam: &'a Exam, section_id: &str) -> AppResult<&'a ExamSection> {
        exam.section(section_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "Section '{}' not found in exam '{}'",
                section_id, exam.id
            ))
        })
    }
}
