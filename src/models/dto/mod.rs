pub mod request;
pub mod response;

pub use request::{AnswerSubmission, PaginationParams, SubmitAnswersRequest};
pub use response::{ApiResponse, QuestionView, QuestionViewDetail, SectionQuestionsView};
