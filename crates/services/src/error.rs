//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::{CatalogError, CategoryId};
use prep_core::quiz::QuizError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the AI helpers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("AI assistant is not configured")]
    Disabled,
    #[error("AI assistant returned an empty response")]
    EmptyResponse,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors from delivering a completed result to the persistence collaborator.
///
/// These never reach the quiz flow; the session service logs and drops them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("result submission failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("unknown quiz category: {0}")]
    UnknownCategory(CategoryId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors emitted by `QuizHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `InterviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InterviewError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by document text extraction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    #[error("Unsupported file type. Please upload PDF, DOCX, or TXT.")]
    Unsupported,
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
    #[error("failed to read Word document: {0}")]
    Docx(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
