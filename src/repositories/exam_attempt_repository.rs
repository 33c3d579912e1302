use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::ExamAttempt};

#[async_trait]
pub trait ExamAttemptRepository: Send + Sync {
    async fn create(&self, attempt: ExamAttempt) -> AppResult<ExamAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ExamAttempt>>;
    /// Persists section results and totals. Conditional on the attempt
    /// still being in progress AND on the version the caller read, so two
    /// interleaved section writes cannot overwrite each other. `None`
    /// means the write lost and must be retried from a fresh read.
    async fn update_sections(&self, attempt: &ExamAttempt) -> AppResult<Option<ExamAttempt>>;
    /// Conditional completion; `None` when the attempt was not in progress.
    async fn complete_in_progress(
        &self,
        id: &str,
        completed_at: DateTime<Utc>,
    ) -> AppResult<Option<ExamAttempt>>;
}

pub struct MongoExamAttemptRepository {
    collection: Collection<ExamAttempt>,
}

impl MongoExamAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("exam_attempts");
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

        let user_exam_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "exam_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_exam".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_exam_index).await?;

        log::info!("Ensured indexes for exam_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl ExamAttemptRepository for MongoExamAttemptRepository {
    async fn create(&self, attempt: ExamAttempt) -> AppResult<ExamAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ExamAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn update_sections(&self, attempt: &ExamAttempt) -> AppResult<Option<ExamAttempt>> {
        let update = doc! {
            "$set": {
                "sections": to_bson(&attempt.sections)?,
                "total_score": attempt.total_score,
                "total_percentage": attempt.total_percentage,
                "total_time_spent": attempt.total_time_spent,
            },
            "$inc": { "version": 1 },
        };

        let updated = self
            .collection
            .find_one_and_update(
                doc! {
                    "id": &attempt.id,
                    "status": "in_progress",
                    "version": attempt.version,
                },
                update,
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }

    async fn complete_in_progress(
        &self,
        id: &str,
        completed_at: DateTime<Utc>,
    ) -> AppResult<Option<ExamAttempt>> {
        let update = doc! {
            "$set": {
                "status": "completed",
                "completed_at": to_bson(&completed_at)?,
            }
        };

        let updated = self
            .collection
            .find_one_and_update(doc! { "id": id, "status": "in_progress" }, update)
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }
}
