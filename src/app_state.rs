use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoBlockProgressRepository, MongoExamAttemptRepository, MongoExamRepository,
        MongoQuizAttemptRepository, MongoQuizRepository,
    },
    services::{BlockProgressService, ExamAttemptService, QuizAttemptService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_attempt_service: Arc<QuizAttemptService>,
    pub exam_attempt_service: Arc<ExamAttemptService>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let exam_repository = Arc::new(MongoExamRepository::new(&db));
        exam_repository.ensure_indexes().await?;

        let quiz_attempt_repository = Arc::new(MongoQuizAttemptRepository::new(&db));
        quiz_attempt_repository.ensure_indexes().await?;

        let exam_attempt_repository = Arc::new(MongoExamAttemptRepository::new(&db));
        exam_attempt_repository.ensure_indexes().await?;

        let block_repository = Arc::new(MongoBlockProgressRepository::new(&db));
        block_repository.ensure_indexes().await?;

        let progress_gate = Arc::new(BlockProgressService::new(block_repository.clone()));

        let quiz_attempt_service = Arc::new(QuizAttemptService::new(
            quiz_repository.clone(),
            quiz_attempt_repository.clone(),
            block_repository,
            progress_gate,
        ));

        let exam_attempt_service = Arc::new(ExamAttemptService::new(
            exam_repository,
            exam_attempt_repository,
            quiz_repository,
            quiz_attempt_repository,
        ));

        Ok(Self {
            quiz_attempt_service,
            exam_attempt_service,
            config: Arc::new(config),
            db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
