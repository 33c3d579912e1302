pub mod block_progress_repository;
pub mod exam_attempt_repository;
pub mod exam_repository;
pub mod quiz_attempt_repository;
pub mod quiz_repository;

pub use block_progress_repository::{BlockProgressRepository, MongoBlockProgressRepository};
pub use exam_attempt_repository::{ExamAttemptRepository, MongoExamAttemptRepository};
pub use exam_repository::{ExamRepository, MongoExamRepository};
pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
