pub mod block_progress;
pub mod exam;
pub mod exam_attempt;
pub mod question;
pub mod quiz;
pub mod quiz_attempt;

pub use block_progress::{BlockProgressStatus, BlockType, ContentBlock, UserBlockProgress};
pub use exam::{Exam, ExamSection, SkillArea};
pub use exam_attempt::{ExamAttempt, SectionResult};
pub use question::{AnswerOption, MatchPair, Question, QuestionKind};
pub use quiz::Quiz;
pub use quiz_attempt::{AnswerRecord, AttemptStatus, BlockContext, QuizAttempt};
