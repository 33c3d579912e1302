pub mod exam_handler;
pub mod health_handler;
pub mod quiz_attempt_handler;

pub use exam_handler::{
    complete_exam, get_exam_attempt, get_section_questions, start_exam, submit_section,
};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use quiz_attempt_handler::{
    get_quiz_attempt, list_quiz_attempts, retry_block_quiz, start_block_quiz, start_quiz,
    submit_quiz_attempt,
};
