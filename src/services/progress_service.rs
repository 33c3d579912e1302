use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    errors::AppResult,
    models::domain::{
        BlockProgressStatus, ContentBlock, QuizAttempt, UserBlockProgress,
    },
    repositories::BlockProgressRepository,
};

/// Consumer of completed attempts. The attempt services notify the gate
/// after persisting a completed attempt; the gate decides whether lesson
/// progress moves.
#[async_trait]
pub trait ProgressGate: Send + Sync {
    async fn on_attempt_completed(&self, attempt: &QuizAttempt) -> AppResult<()>;
}

pub struct BlockProgressService {
    repository: Arc<dyn BlockProgressRepository>,
}

impl BlockProgressService {
    pub fn new(repository: Arc<dyn BlockProgressRepository>) -> Self {
        Self { repository }
    }

    /// Marks the block completed for the user. A no-op when the block is
    /// already completed, so replayed notifications are harmless.
    async fn complete_block(&self, user_id: &str, block: &ContentBlock) -> AppResult<()> {
        match self.repository.find_progress(user_id, &block.id).await? {
            Some(progress) if progress.status == BlockProgressStatus::Completed => {}
            Some(_) => {
                self.repository
                    .set_progress_status(
                        user_id,
                        &block.id,
                        BlockProgressStatus::Completed,
                        Some(Utc::now()),
                    )
                    .await?;
            }
            None => {
                let mut progress =
                    UserBlockProgress::new(user_id, block, BlockProgressStatus::Completed);
                progress.completed_at = Some(Utc::now());
                self.repository.insert_progress(progress).await?;
            }
        }
        Ok(())
    }

    /// Unlocks the block that follows `block` in lesson order, if any and
    /// if it is still locked.
    async fn unlock_next(&self, user_id: &str, block: &ContentBlock) -> AppResult<()> {
        let Some(next) = self
            .repository
            .find_next_block(&block.lesson_id, block.order)
            .await?
        else {
            return Ok(());
        };

        match self.repository.find_progress(user_id, &next.id).await? {
            Some(progress) if progress.status == BlockProgressStatus::Locked => {
                self.repository
                    .set_progress_status(user_id, &next.id, BlockProgressStatus::Unlocked, None)
                    .await?;
            }
            Some(_) => {}
            None => {
                self.repository
                    .insert_progress(UserBlockProgress::new(
                        user_id,
                        &next,
                        BlockProgressStatus::Unlocked,
                    ))
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressGate for BlockProgressService {
    async fn on_attempt_completed(&self, attempt: &QuizAttempt) -> AppResult<()> {
        if !attempt.is_passed {
            return Ok(());
        }
        let Some(context) = &attempt.block else {
            return Ok(());
        };

        let Some(block) = self.repository.find_block(&context.block_id).await? else {
            log::warn!(
                "Attempt {} references missing block {}",
                attempt.id,
                context.block_id
            );
            return Ok(());
        };

        self.complete_block(&attempt.user_id, &block).await?;
        self.unlock_next(&attempt.user_id, &block).await?;

        Ok(())
    }
}
