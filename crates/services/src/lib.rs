#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod documents;
pub mod error;
pub mod history;
pub mod interviews;
pub mod question_bank;
pub mod quiz;

pub use prep_core::Clock;

pub use app_services::AppServices;
pub use documents::{DocumentKind, extract_text};
pub use error::{
    AiError, AppServicesError, ExtractError, HistoryError, InterviewError, QuizSessionError,
    SubmitError,
};
pub use history::{CategoryStats, QuizHistoryService, QuizStats};
pub use interviews::InterviewService;
pub use question_bank::{QuestionBankItem, QuestionBankService};
pub use quiz::{QuizSessionService, QuizView, ResultSubmitter};
