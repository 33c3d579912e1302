use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Exam};

#[async_trait]
pub trait ExamRepository: Send + Sync {
    async fn create(&self, exam: Exam) -> AppResult<Exam>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Exam>>;
}

pub struct MongoExamRepository {
    collection: Collection<Exam>,
}

impl MongoExamRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("exams");
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

        self.collection.create_index(id_index).await?;
        log::info!("Ensured indexes for exams collection");
        Ok(())
    }
}

#[async_trait]
impl ExamRepository for MongoExamRepository {
    async fn create(&self, exam: Exam) -> AppResult<Exam> {
        self.collection.insert_one(&exam).await?;
        Ok(exam)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Exam>> {
        let exam = self.collection.find_one(doc! { "id": id }).await?;
        Ok(exam)
    }
}
