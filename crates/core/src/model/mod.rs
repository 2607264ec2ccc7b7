mod catalog;
mod category;
mod ids;
mod interview;
mod result;

pub use ids::{AttemptId, CategoryId, ParseIdError, QuestionId, UserId};

pub use catalog::{Catalog, CatalogError, QuestionFilter, QuestionHit};
pub use category::{
    CategoryError, Difficulty, ParseDifficultyError, Question, QuestionError, QuizCategory,
};
pub use interview::{
    ChatRole, ChatTurn, DEFAULT_INTERVIEW_MINUTES, InterviewEnd, InterviewSession,
    InterviewSetup, InterviewSetupError, InterviewStatus, ParseInterviewStatusError,
};
pub use result::{QuizResult, QuizResultError};
