use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        BlockContext, BlockProgressStatus, Quiz, QuizAttempt, UserBlockProgress,
    },
    models::dto::request::{PaginationParams, SubmitAnswersRequest},
    repositories::{BlockProgressRepository, QuizAttemptRepository, QuizRepository},
    services::progress_service::ProgressGate,
    services::scoring_service::ScoringService,
};

/// Tolerance (seconds) allowed between client-reported time and the
/// server-side elapsed time before the report is treated as an anomaly.
const TIME_REPORT_TOLERANCE_SECS: i64 = 30;

/// Pass threshold (percent) for quizzes attached to lesson blocks.
const BLOCK_PASS_SCORE: f64 = 65.0;

pub struct QuizAttemptService {
    quiz_repository: Arc<dyn QuizRepository>,
    attempt_repository: Arc<dyn QuizAttemptRepository>,
    block_repository: Arc<dyn BlockProgressRepository>,
    progress_gate: Arc<dyn ProgressGate>,
}

impl QuizAttemptService {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
        block_repository: Arc<dyn BlockProgressRepository>,
        progress_gate: Arc<dyn ProgressGate>,
    ) -> Self {
        Self {
            quiz_repository,
            attempt_repository,
            block_repository,
            progress_gate,
        }
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

    /// Starts a standalone quiz attempt. An in-progress attempt for the
    /// same quiz is returned as-is rather than duplicated.
    pub async fn start_quiz(&self, user_id: &str, quiz_id: &str) -> AppResult<QuizAttempt> {
        let quiz = self.load_quiz(quiz_id).await?;

        if let Some(existing) = self
            .attempt_repository
            .find_in_progress_for_quiz(user_id, quiz_id)
            .await?
        {
            return Ok(existing);
        }

        let attempt = QuizAttempt::start(user_id, quiz_id, quiz.total_questions);
        self.attempt_repository.create(attempt).await
    }

    /// Starts a block-scoped attempt. Block quizzes are
    /// single-attempt-in-flight: an existing in-progress attempt is a
    /// conflict, resolved by the retry path.
    pub async fn start_block_quiz(&self, user_id: &str, block_id: &str) -> AppResult<QuizAttempt> {
        if let Some(existing) = self
            .attempt_repository
            .find_in_progress_for_block(user_id, block_id)
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "An attempt for block '{}' is already in progress (id '{}')",
                block_id, existing.id
            )));
        }

        self.start_block_attempt(user_id, block_id).await
    }

    /// Abandons any in-progress attempt for the block and starts a fresh
    /// one against the same quiz.
    pub async fn retry_block_quiz(&self, user_id: &str, block_id: &str) -> AppResult<QuizAttempt> {
        if let Some(existing) = self
            .attempt_repository
            .find_in_progress_for_block(user_id, block_id)
            .await?
        {
            self.attempt_repository.mark_abandoned(&existing.id).await?;
        }

        self.start_block_attempt(user_id, block_id).await
    }

    async fn start_block_attempt(&self, user_id: &str, block_id: &str) -> AppResult<QuizAttempt> {
        let block = self
            .block_repository
            .find_block(block_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Block with id '{}' not found", block_id))
            })?;

        let quiz_id = block.quiz_id.clone().ok_or_else(|| {
            AppError::BadRequest(format!("Block '{}' has no quiz attached", block_id))
        })?;

        let quiz = self.load_quiz(&quiz_id).await?;

        // A user starting a block quiz has necessarily reached the block;
        // create its progress record if it is missing.
        let progress = match self.block_repository.find_progress(user_id, block_id).await? {
            Some(progress) => progress,
            None => {
                self.block_repository
                    .insert_progress(UserBlockProgress::new(
                        user_id,
                        &block,
                        BlockProgressStatus::Unlocked,
                    ))
                    .await?
            }
        };

        let attempt = QuizAttempt::start_for_block(
            user_id,
            &quiz_id,
            quiz.total_questions,
            BlockContext {
                block_id: block_id.to_string(),
                block_progress_id: progress.id,
            },
        );
        self.attempt_repository.create(attempt).await
    }

    /// Grades and completes an in-progress attempt. The completion write is
    /// conditional on `status == in_progress`, so a concurrent second submit
    /// loses the race and surfaces as `InvalidState`.
    pub async fn submit(
        &self,
        attempt_id: &str,
        user_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<QuizAttempt> {
        request.validate()?;

        let mut attempt = self
            .attempt_repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id))
            })?;

        if attempt.user_id != user_id {
            return Err(AppError::Unauthorized(
                "Attempt belongs to a different user".to_string(),
            ));
        }
        if !attempt.is_in_progress() {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' has already been submitted",
                attempt_id
            )));
        }

        let quiz = self.load_quiz(&attempt.quiz_id).await?;

        let graded = ScoringService::grade(&quiz.questions, &request.answers);
        let percentage = ScoringService::percentage(graded.score, quiz.total_points);
        let threshold = if attempt.is_block_scoped() {
            BLOCK_PASS_SCORE
        } else {
            quiz.pass_score
        };

        let completed_at = Utc::now();
        attempt.answers = graded.answers;
        attempt.score = graded.score;
        attempt.percentage = percentage;
        attempt.correct_answers = graded.correct_answers;
        attempt.time_spent = checked_time_spent(
            attempt_id,
            request.time_spent,
            (completed_at - attempt.started_at).num_seconds(),
        );
        attempt.completed_at = Some(completed_at);
        attempt.is_passed = percentage >= threshold;

        let persisted = self
            .attempt_repository
            .complete_in_progress(&attempt)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Attempt '{}' has already been submitted",
                    attempt_id
                ))
            })?;

        self.progress_gate.on_attempt_completed(&persisted).await?;

        Ok(persisted)
    }

    pub async fn get_attempt(&self, attempt_id: &str, user_id: &str) -> AppResult<QuizAttempt> {
        let attempt = self
            .attempt_repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id))
            })?;

        if attempt.user_id != user_id {
            return Err(AppError::Unauthorized(
                "Attempt belongs to a different user".to_string(),
            ));
        }

        Ok(attempt)
    }

    /// The user's attempt history, most recent first.
    pub async fn list_attempts(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> AppResult<Vec<QuizAttempt>> {
        params.validate()?;
        self.attempt_repository
            .find_by_user(user_id, params.offset(), params.limit())
            .await
    }
}

/// Time limits are advisory, but the client-reported duration is checked
/// against the server clock. An over-report is logged and clamped rather
/// than rejected.
pub(crate) fn checked_time_spent(
    attempt_id: &str,
    reported: Option<i64>,
    server_elapsed: i64,
) -> i64 {
    let server_elapsed = server_elapsed.max(0);
    match reported {
        Some(reported) if reported > server_elapsed + TIME_REPORT_TOLERANCE_SECS => {
            log::warn!(
                "Attempt {}: client reported {}s but only {}s elapsed server-side; clamping",
                attempt_id,
                reported,
                server_elapsed
            );
            server_elapsed
        }
        Some(reported) => reported.max(0),
        None => server_elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_time_within_tolerance_is_kept() {
        assert_eq!(checked_time_spent("a-1", Some(100), 90), 100);
        assert_eq!(checked_time_spent("a-1", Some(50), 90), 50);
    }

    #[test]
    fn over_reported_time_is_clamped_to_server_elapsed() {
        assert_eq!(checked_time_spent("a-1", Some(500), 90), 90);
    }

    #[test]
    fn missing_report_falls_back_to_server_elapsed() {
        assert_eq!(checked_time_spent("a-1", None, 90), 90);
    }

    #[test]
    fn negative_values_never_escape() {
        assert_eq!(checked_time_spent("a-1", Some(-5), 90), 0);
        assert_eq!(checked_time_spent("a-1", None, -3), 0);
    }
}
