use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{AttemptId, CategoryId, Question, QuizCategory};
use crate::time::format_countdown;

use super::scoring::{count_correct, score_percent};

/// Why an attempt reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The last question was advanced past.
    Finished,
    /// The countdown reached zero.
    TimedOut,
}

/// Scored result of a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    pub attempt_id: AttemptId,
    pub category_id: CategoryId,
    pub category_title: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u8,
    pub elapsed_secs: u32,
    pub answers: Vec<Option<usize>>,
    pub reason: CompletionReason,
}

/// Position within an attempt, for progress bars and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
}

/// One row of the post-completion review.
#[derive(Debug, Clone, Copy)]
pub struct QuestionReview<'a> {
    pub question: &'a Question,
    pub chosen: Option<usize>,
    pub is_correct: bool,
}

/// One user's run through a category.
///
/// Question data stays in the shared category; the attempt only owns the answer
/// slots, its position and the countdown.
pub struct QuizAttempt {
    id: AttemptId,
    category: Arc<QuizCategory>,
    answers: Vec<Option<usize>>,
    current: usize,
    remaining_secs: u32,
    outcome: Option<QuizOutcome>,
}

impl QuizAttempt {
    pub(crate) fn new(category: Arc<QuizCategory>) -> Self {
        let answers = vec![None; category.question_count()];
        let remaining_secs = category.time_limit_secs();
        Self {
            id: AttemptId::generate(),
            category,
            answers,
            current: 0,
            remaining_secs,
            outcome: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> &QuizCategory {
        &self.category
    }

    /// Answer slots, one per question; `None` means unanswered.
    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.category.question(self.current)
    }

    /// Selection recorded for the current question, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.current).copied().flatten()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.answers.len()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Remaining time as `mm:ss`.
    #[must_use]
    pub fn remaining_display(&self) -> String {
        format_countdown(self.remaining_secs)
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.category
            .time_limit_secs()
            .saturating_sub(self.remaining_secs)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            current_index: self.current,
            total: self.answers.len(),
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// The scored outcome; `None` until the attempt completes.
    #[must_use]
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    /// Per-question review, available once the attempt is completed.
    #[must_use]
    pub fn review(&self) -> Option<Vec<QuestionReview<'_>>> {
        self.outcome.as_ref()?;
        Some(
            self.category
                .questions()
                .iter()
                .zip(&self.answers)
                .map(|(question, chosen)| QuestionReview {
                    question,
                    chosen: *chosen,
                    is_correct: question.is_correct(*chosen),
                })
                .collect(),
        )
    }

    pub(crate) fn record_answer(&mut self, option: usize) {
        if let Some(slot) = self.answers.get_mut(self.current) {
            *slot = Some(option);
        }
    }

    pub(crate) fn step_forward(&mut self) {
        self.current += 1;
    }

    /// Decrements the countdown, returning the new remaining time.
    pub(crate) fn count_down(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }

    /// Scores the attempt and freezes it. Returns `None` if it was already completed.
    pub(crate) fn complete(&mut self, reason: CompletionReason) -> Option<QuizOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        let correct_answers = count_correct(self.category.questions(), &self.answers);
        let total_questions = u32::try_from(self.answers.len()).unwrap_or(u32::MAX);
        let outcome = QuizOutcome {
            attempt_id: self.id,
            category_id: self.category.id().clone(),
            category_title: self.category.title().to_string(),
            total_questions,
            correct_answers,
            score: score_percent(correct_answers, total_questions),
            elapsed_secs: self.elapsed_secs(),
            answers: self.answers.clone(),
            reason,
        };
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }
}

impl fmt::Debug for QuizAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizAttempt")
            .field("id", &self.id)
            .field("category", self.category.id())
            .field("current", &self.current)
            .field("remaining_secs", &self.remaining_secs)
            .field("completed", &self.outcome.is_some())
            .finish_non_exhaustive()
    }
}
