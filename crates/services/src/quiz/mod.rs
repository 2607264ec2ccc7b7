//! Quiz sessions on top of the core engine: catalog lookup, result records and
//! fire-and-forget submission.

mod service;
mod submission;
mod view;

pub use crate::error::{QuizSessionError, SubmitError};
pub use service::QuizSessionService;
pub use submission::{HttpSubmitter, QuizSubmission, RepositorySubmitter, ResultSubmitter};
pub use view::{ActiveQuestionView, CategorySummary, QuizView};
