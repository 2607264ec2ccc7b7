use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{CategoryId, UserId};
use crate::quiz::QuizOutcome;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("total questions must be > 0")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("score must be within 0..=100, got {0}")]
    ScoreOutOfRange(u8),
}

/// A completed attempt as handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    user_id: UserId,
    category_id: CategoryId,
    category_title: String,
    total_questions: u32,
    correct_answers: u32,
    score: u8,
    elapsed_secs: u32,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Builds the result record for a freshly scored attempt.
    #[must_use]
    pub fn from_outcome(
        user_id: UserId,
        outcome: &QuizOutcome,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            category_id: outcome.category_id.clone(),
            category_title: outcome.category_title.clone(),
            total_questions: outcome.total_questions,
            correct_answers: outcome.correct_answers,
            score: outcome.score,
            elapsed_secs: outcome.elapsed_secs,
            completed_at,
        }
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if the counts or score are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user_id: UserId,
        category_id: CategoryId,
        category_title: String,
        total_questions: u32,
        correct_answers: u32,
        score: u8,
        elapsed_secs: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if total_questions == 0 {
            return Err(QuizResultError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(QuizResultError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }
        if score > 100 {
            return Err(QuizResultError::ScoreOutOfRange(score));
        }

        Ok(Self {
            user_id,
            category_id,
            category_title,
            total_questions,
            correct_answers,
            score,
            elapsed_secs,
            completed_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    #[must_use]
    pub fn category_title(&self) -> &str {
        &self.category_title
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
