use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{BlockProgressStatus, ContentBlock, UserBlockProgress},
};

#[async_trait]
pub trait BlockProgressRepository: Send + Sync {
    async fn find_block(&self, block_id: &str) -> AppResult<Option<ContentBlock>>;
    /// The next block of the same lesson, by presentation order.
    async fn find_next_block(
        &self,
        lesson_id: &str,
        after_order: i32,
    ) -> AppResult<Option<ContentBlock>>;
    async fn find_progress(
        &self,
        user_id: &str,
        block_id: &str,
    ) -> AppResult<Option<UserBlockProgress>>;
    async fn insert_progress(&self, progress: UserBlockProgress) -> AppResult<UserBlockProgress>;
    /// Returns false when nothing matched (progress record absent).
    async fn set_progress_status(
        &self,
        user_id: &str,
        block_id: &str,
        status: BlockProgressStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool>;
}

pub struct MongoBlockProgressRepository {
    blocks: Collection<ContentBlock>,
    progress: Collection<UserBlockProgress>,
}

impl MongoBlockProgressRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            blocks: db.get_collection("content_blocks"),
            progress: db.get_collection("block_progress"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let block_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let lesson_order_index = IndexModel::builder()
            .keys(doc! { "lesson_id": 1, "order": 1 })
            .options(
                IndexOptions::builder()
                    .name("lesson_order".to_string())
                    .build(),
            )
            .build();

        let user_block_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "block_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_block_unique".to_string())
                    .build(),
            )
            .build();

        self.blocks.create_index(block_id_index).await?;
        self.blocks.create_index(lesson_order_index).await?;
        self.progress.create_index(user_block_index).await?;

        log::info!("Ensured indexes for content_blocks and block_progress collections");
        Ok(())
    }
}

#[async_trait]
impl BlockProgressRepository for MongoBlockProgressRepository {
    async fn find_block(&self, block_id: &str) -> AppResult<Option<ContentBlock>> {
        let block = self.blocks.find_one(doc! { "id": block_id }).await?;
        Ok(block)
    }

    async fn find_next_block(
        &self,
        lesson_id: &str,
        after_order: i32,
    ) -> AppResult<Option<ContentBlock>> {
        let block = self
            .blocks
            .find_one(doc! {
                "lesson_id": lesson_id,
                "order": { "$gt": after_order },
            })
            .sort(doc! { "order": 1 })
            .await?;
        Ok(block)
    }

    async fn find_progress(
        &self,
        user_id: &str,
        block_id: &str,
    ) -> AppResult<Option<UserBlockProgress>> {
        let progress = self
            .progress
            .find_one(doc! { "user_id": user_id, "block_id": block_id })
            .await?;
        Ok(progress)
    }

    async fn insert_progress(&self, progress: UserBlockProgress) -> AppResult<UserBlockProgress> {
        self.progress.insert_one(&progress).await?;
        Ok(progress)
    }

    async fn set_progress_status(
        &self,
        user_id: &str,
        block_id: &str,
        status: BlockProgressStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let update = doc! {
            "$set": {
                "status": to_bson(&status)?,
                "completed_at": to_bson(&completed_at)?,
            }
        };

        let result = self
            .progress
            .update_one(doc! { "user_id": user_id, "block_id": block_id }, update)
            .await?;

        Ok(result.matched_count > 0)
    }
}
