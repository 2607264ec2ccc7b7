use prep_core::model::{CategoryId, Difficulty, QuizCategory};
use prep_core::quiz::{QuizAttempt, QuizOutcome, QuizState};

/// Presentation-agnostic snapshot of the running quiz.
///
/// Holds owned data so a front end can render it without borrowing the
/// session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizView {
    NotStarted,
    Active(ActiveQuestionView),
    Completed(QuizOutcome),
}

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuestionView {
    pub category_id: CategoryId,
    pub category_title: String,
    /// Zero-based.
    pub question_index: usize,
    pub question_count: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub is_last_question: bool,
    pub remaining_secs: u32,
    pub remaining_display: String,
}

impl ActiveQuestionView {
    #[must_use]
    pub fn from_attempt(attempt: &QuizAttempt) -> Option<Self> {
        let question = attempt.current_question()?;
        let category = attempt.category();
        Some(Self {
            category_id: category.id().clone(),
            category_title: category.title().to_string(),
            question_index: attempt.current_index(),
            question_count: category.question_count(),
            prompt: question.prompt().to_string(),
            options: question.options().to_vec(),
            selected: attempt.current_answer(),
            is_last_question: attempt.is_last_question(),
            remaining_secs: attempt.remaining_secs(),
            remaining_display: attempt.remaining_display(),
        })
    }

    /// One-based counter, e.g. `3 / 10`.
    #[must_use]
    pub fn counter(&self) -> String {
        format!("{} / {}", self.question_index + 1, self.question_count)
    }
}

impl QuizView {
    #[must_use]
    pub fn from_state(state: QuizState, attempt: Option<&QuizAttempt>) -> Self {
        match (state, attempt) {
            (QuizState::Active, Some(attempt)) => ActiveQuestionView::from_attempt(attempt)
                .map_or(Self::NotStarted, Self::Active),
            (QuizState::Completed, Some(attempt)) => attempt
                .outcome()
                .cloned()
                .map_or(Self::NotStarted, Self::Completed),
            _ => Self::NotStarted,
        }
    }
}

/// Category card for the selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub time_limit_secs: u32,
}

impl CategorySummary {
    #[must_use]
    pub fn from_category(category: &QuizCategory) -> Self {
        Self {
            id: category.id().clone(),
            title: category.title().to_string(),
            description: category.description().to_string(),
            difficulty: category.difficulty(),
            question_count: category.question_count(),
            time_limit_secs: category.time_limit_secs(),
        }
    }

    /// Whole minutes in the time limit, as shown on the selection screen.
    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_secs / 60
    }
}
