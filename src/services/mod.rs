pub mod exam_attempt_service;
pub mod progress_service;
pub mod quiz_attempt_service;
pub mod scoring_service;

pub use exam_attempt_service::ExamAttemptService;
pub use progress_service::{BlockProgressService, ProgressGate};
pub use quiz_attempt_service::QuizAttemptService;
pub use scoring_service::{GradedSheet, ScoringService};
