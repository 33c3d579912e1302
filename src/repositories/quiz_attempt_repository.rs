use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::QuizAttempt};

#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    async fn find_in_progress_for_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizAttempt>>;
    async fn find_in_progress_for_block(
        &self,
        user_id: &str,
        block_id: &str,
    ) -> AppResult<Option<QuizAttempt>>;
    /// Conditional update: writes the completed attempt only while the stored
    /// document is still `in_progress`. Returns `None` when another submit
    /// already won the race.
    async fn complete_in_progress(&self, attempt: &QuizAttempt) -> AppResult<Option<QuizAttempt>>;
    /// Returns false when no in-progress attempt matched.
    async fn mark_abandoned(&self, id: &str) -> AppResult<bool>;
    /// Most recent attempts first.
    async fn find_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<QuizAttempt>>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_quiz_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "quiz_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_quiz_status".to_string())
                    .build(),
            )
            .build();

        let user_block_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "block.block_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_block_status".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_quiz_index).await?;
        self.collection.create_index(user_block_index).await?;

        log::info!("Ensured indexes for quiz_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_in_progress_for_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "quiz_id": quiz_id,
                "block": null,
                "status": "in_progress",
            })
            .await?;
        Ok(attempt)
    }

    async fn find_in_progress_for_block(
        &self,
        user_id: &str,
        block_id: &str,
    ) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "block.block_id": block_id,
                "status": "in_progress",
            })
            .await?;
        Ok(attempt)
    }

    async fn complete_in_progress(&self, attempt: &QuizAttempt) -> AppResult<Option<QuizAttempt>> {
        let update = doc! {
            "$set": {
                "answers": to_bson(&attempt.answers)?,
                "score": attempt.score,
                "percentage": attempt.percentage,
                "correct_answers": attempt.correct_answers,
                "time_spent": attempt.time_spent,
                "status": "completed",
                "completed_at": to_bson(&attempt.completed_at)?,
                "is_passed": attempt.is_passed,
            }
        };

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "id": &attempt.id, "status": "in_progress" },
                update,
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }

    async fn mark_abandoned(&self, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id, "status": "in_progress" },
                doc! { "$set": { "status": "abandoned" } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "started_at": -1 })
            .skip(offset.max(0) as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }
}
