use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct option {index} is out of range for {count} options")]
    CorrectOptionOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category id cannot be empty")]
    EmptyId,

    #[error("category title cannot be empty")]
    EmptyTitle,

    #[error("category {id} has no questions")]
    NoQuestions { id: String },

    #[error("category {id} time limit must be > 0")]
    InvalidTimeLimit { id: String },

    #[error("category {id} repeats question id {question}")]
    DuplicateQuestion { id: String, question: QuestionId },

    #[error("category {id}: {source}")]
    InvalidQuestion {
        id: String,
        #[source]
        source: QuestionError,
    },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Advisory difficulty label shown next to a category. Never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// Error returned when a difficulty label is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {raw}")]
pub struct ParseDifficultyError {
    raw: String,
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError { raw: s.to_string() }),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question. Options are index-addressable and their
/// order is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_option: usize,
    explanation: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are fewer than two
    /// options, an option is blank, or `correct_option` is not a valid index.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if correct_option >= options.len() {
            return Err(QuestionError::CorrectOptionOutOfRange {
                index: correct_option,
                count: options.len(),
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_option,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Returns true when `choice` is the correct option. `None` never matches.
    #[must_use]
    pub fn is_correct(&self, choice: Option<usize>) -> bool {
        choice == Some(self.correct_option)
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// A named, fixed set of questions sharing a time limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCategory {
    id: CategoryId,
    title: String,
    description: String,
    difficulty: Difficulty,
    questions: Vec<Question>,
    time_limit_secs: u32,
}

impl QuizCategory {
    /// Creates a validated category.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError` if the id or title is blank, there are no
    /// questions, the time limit is zero, or question ids repeat.
    pub fn new(
        id: CategoryId,
        title: impl Into<String>,
        description: impl Into<String>,
        difficulty: Difficulty,
        questions: Vec<Question>,
        time_limit_secs: u32,
    ) -> Result<Self, CategoryError> {
        if id.as_str().trim().is_empty() {
            return Err(CategoryError::EmptyId);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CategoryError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(CategoryError::NoQuestions {
                id: id.to_string(),
            });
        }
        if time_limit_secs == 0 {
            return Err(CategoryError::InvalidTimeLimit {
                id: id.to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(CategoryError::DuplicateQuestion {
                    id: id.to_string(),
                    question: question.id(),
                });
            }
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            difficulty,
            questions,
            time_limit_secs,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
