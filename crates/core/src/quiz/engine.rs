use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::model::QuizCategory;

use super::attempt::{CompletionReason, QuizAttempt, QuizOutcome};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no active quiz attempt")]
    NotActive,

    #[error("invalid option index {index}: question has {count} options")]
    InvalidOptionIndex { index: usize, count: usize },

    #[error("no answer selected")]
    NoAnswerSelected,
}

/// Lifecycle of the engine's attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    Active,
    Completed,
}

/// Drives a single quiz attempt from category selection to a scored result.
///
/// All mutation goes through `&mut self`; a host that receives events on several
/// threads must serialise them before they reach the engine.
#[derive(Debug, Default)]
pub struct QuizEngine {
    attempt: Option<QuizAttempt>,
}

impl QuizEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        match &self.attempt {
            None => QuizState::NotStarted,
            Some(attempt) if attempt.is_completed() => QuizState::Completed,
            Some(_) => QuizState::Active,
        }
    }

    #[must_use]
    pub fn attempt(&self) -> Option<&QuizAttempt> {
        self.attempt.as_ref()
    }

    /// Starts a fresh attempt, discarding any previous one.
    pub fn start(&mut self, category: Arc<QuizCategory>) -> &QuizAttempt {
        if let Some(previous) = self.attempt.take() {
            debug!("discarding attempt {} on restart", previous.id());
        }
        let attempt = QuizAttempt::new(category);
        debug!(
            "started attempt {} for category {} ({} questions, {}s)",
            attempt.id(),
            attempt.category().id(),
            attempt.category().question_count(),
            attempt.remaining_secs()
        );
        self.attempt.insert(attempt)
    }

    /// Records `option` for the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` unless an attempt is in progress, and
    /// `QuizError::InvalidOptionIndex` if `option` is not a valid index.
    pub fn select_answer(&mut self, option: usize) -> Result<(), QuizError> {
        let attempt = self.active_mut()?;
        let count = attempt
            .current_question()
            .map_or(0, crate::model::Question::option_count);
        if option >= count {
            return Err(QuizError::InvalidOptionIndex {
                index: option,
                count,
            });
        }
        attempt.record_answer(option);
        Ok(())
    }

    /// Moves past the current question, completing the attempt on the last one.
    ///
    /// Returns the outcome when this call completed the attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` unless an attempt is in progress, and
    /// `QuizError::NoAnswerSelected` if the current question is unanswered. The
    /// engine is left untouched on error.
    pub fn advance(&mut self) -> Result<Option<QuizOutcome>, QuizError> {
        let attempt = self.active_mut()?;
        if attempt.current_answer().is_none() {
            return Err(QuizError::NoAnswerSelected);
        }
        if attempt.is_last_question() {
            let outcome = attempt.complete(CompletionReason::Finished);
            if let Some(outcome) = &outcome {
                log_completion(outcome);
            }
            return Ok(outcome);
        }
        attempt.step_forward();
        Ok(None)
    }

    /// One elapsed second. Completes the attempt when the countdown hits zero.
    ///
    /// A no-op outside `Active`, so a scheduler that keeps ticking after
    /// completion changes nothing.
    pub fn tick(&mut self) -> Option<QuizOutcome> {
        let attempt = self.active_mut().ok()?;
        if attempt.count_down() > 0 {
            return None;
        }
        let outcome = attempt.complete(CompletionReason::TimedOut);
        if let Some(outcome) = &outcome {
            log_completion(outcome);
        }
        outcome
    }

    /// Drops the current attempt, if any.
    pub fn reset(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            debug!("reset attempt {}", attempt.id());
        }
    }

    fn active_mut(&mut self) -> Result<&mut QuizAttempt, QuizError> {
        match self.attempt.as_mut() {
            Some(attempt) if !attempt.is_completed() => Ok(attempt),
            _ => Err(QuizError::NotActive),
        }
    }
}

fn log_completion(outcome: &QuizOutcome) {
    info!(
        "attempt {} for {} completed ({:?}): {}/{} correct, score {}, {}s",
        outcome.attempt_id,
        outcome.category_id,
        outcome.reason,
        outcome.correct_answers,
        outcome.total_questions,
        outcome.score,
        outcome.elapsed_secs
    );
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, Difficulty, Question, QuestionId};

    fn category(correct: &[usize], time_limit_secs: u32) -> Arc<QuizCategory> {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let id = u32::try_from(i + 1).unwrap();
                let options = vec!["A".into(), "B".into(), "C".into(), "D".into()];
                Question::new(QuestionId::new(id), format!("Q{id}"), options, c, "why").unwrap()
            })
            .collect();
        Arc::new(
            QuizCategory::new(
                CategoryId::new("test"),
                "Test",
                "",
                Difficulty::Easy,
                questions,
                time_limit_secs,
            )
            .unwrap(),
        )
    }

    #[test]
    fn starts_with_all_slots_unanswered_and_full_time() {
        let mut engine = QuizEngine::new();
        assert_eq!(engine.state(), QuizState::NotStarted);

        let attempt = engine.start(category(&[0, 1, 2, 3, 0], 90));
        assert_eq!(attempt.answers(), &[None; 5]);
        assert_eq!(attempt.remaining_secs(), 90);
        assert_eq!(attempt.current_index(), 0);
        assert!(attempt.outcome().is_none());
        assert_eq!(engine.state(), QuizState::Active);
    }

    #[test]
    fn three_question_scenario_scores_67() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[1, 1, 0], 60));

        engine.select_answer(1).unwrap();
        assert_eq!(engine.advance().unwrap(), None);
        engine.select_answer(0).unwrap();
        assert_eq!(engine.advance().unwrap(), None);
        engine.select_answer(0).unwrap();
        let outcome = engine.advance().unwrap().expect("last advance completes");

        assert_eq!(outcome.correct_answers, 2);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(outcome.score, 67);
        assert_eq!(outcome.reason, CompletionReason::Finished);
        assert_eq!(outcome.answers, vec![Some(1), Some(0), Some(0)]);
        assert_eq!(engine.state(), QuizState::Completed);
        assert_eq!(engine.attempt().unwrap().outcome(), Some(&outcome));
    }

    #[test]
    fn completion_fires_once() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0], 10));
        engine.select_answer(0).unwrap();
        assert!(engine.advance().unwrap().is_some());

        assert_eq!(engine.advance(), Err(QuizError::NotActive));
        assert_eq!(engine.select_answer(0), Err(QuizError::NotActive));
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.attempt().unwrap().outcome().unwrap().score, 100);
    }

    #[test]
    fn answer_can_change_until_advanced() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[2, 0], 30));
        engine.select_answer(0).unwrap();
        engine.select_answer(3).unwrap();
        engine.select_answer(2).unwrap();
        assert_eq!(engine.attempt().unwrap().current_answer(), Some(2));

        engine.advance().unwrap();
        engine.select_answer(1).unwrap();
        let answers = engine.attempt().unwrap().answers();
        assert_eq!(answers, &[Some(2), Some(1)]);
    }

    #[test]
    fn rejects_out_of_range_option_without_recording() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0, 0], 30));
        assert_eq!(
            engine.select_answer(4),
            Err(QuizError::InvalidOptionIndex { index: 4, count: 4 })
        );
        assert_eq!(engine.attempt().unwrap().current_answer(), None);
    }

    #[test]
    fn advance_without_answer_is_rejected_and_changes_nothing() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0, 0, 0], 30));
        engine.select_answer(0).unwrap();
        engine.advance().unwrap();

        assert_eq!(engine.advance(), Err(QuizError::NoAnswerSelected));
        assert_eq!(engine.state(), QuizState::Active);
        assert_eq!(engine.attempt().unwrap().current_index(), 1);
    }

    #[test]
    fn select_and_advance_before_start_are_rejected() {
        let mut engine = QuizEngine::new();
        assert_eq!(engine.select_answer(0), Err(QuizError::NotActive));
        assert_eq!(engine.advance(), Err(QuizError::NotActive));
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.state(), QuizState::NotStarted);
    }

    #[test]
    fn timeout_with_no_answers_scores_zero() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0, 1, 2], 10));

        for _ in 0..9 {
            assert_eq!(engine.tick(), None);
        }
        assert_eq!(engine.attempt().unwrap().remaining_secs(), 1);

        let outcome = engine.tick().expect("tenth tick completes");
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.elapsed_secs, 10);
        assert_eq!(outcome.reason, CompletionReason::TimedOut);
        assert_eq!(outcome.answers, vec![None, None, None]);
        assert_eq!(engine.state(), QuizState::Completed);
    }

    #[test]
    fn ticks_after_timeout_are_noops() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[1, 1], 3));
        engine.select_answer(1).unwrap();

        let mut completions = 0;
        for _ in 0..10 {
            if engine.tick().is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        let attempt = engine.attempt().unwrap();
        assert_eq!(attempt.remaining_secs(), 0);
        // current question's recorded answer still counts on timeout
        assert_eq!(attempt.outcome().unwrap().correct_answers, 1);
        assert_eq!(attempt.outcome().unwrap().score, 50);
    }

    #[test]
    fn elapsed_reflects_ticks_before_finishing() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0], 120));
        for _ in 0..45 {
            engine.tick();
        }
        engine.select_answer(0).unwrap();
        let outcome = engine.advance().unwrap().unwrap();
        assert_eq!(outcome.elapsed_secs, 45);
        assert_eq!(engine.attempt().unwrap().remaining_display(), "01:15");
    }

    #[test]
    fn reset_then_start_is_uncontaminated() {
        let mut engine = QuizEngine::new();
        let cat = category(&[0, 0], 20);
        engine.start(Arc::clone(&cat));
        engine.select_answer(3).unwrap();
        engine.tick();
        let first_id = engine.attempt().unwrap().id();

        engine.reset();
        assert_eq!(engine.state(), QuizState::NotStarted);
        assert!(engine.attempt().is_none());

        let attempt = engine.start(cat);
        assert_ne!(attempt.id(), first_id);
        assert_eq!(attempt.answers(), &[None, None]);
        assert_eq!(attempt.remaining_secs(), 20);
    }

    #[test]
    fn reset_from_completed_and_not_started() {
        let mut engine = QuizEngine::new();
        engine.reset();
        assert_eq!(engine.state(), QuizState::NotStarted);

        engine.start(category(&[0], 1));
        engine.tick();
        assert_eq!(engine.state(), QuizState::Completed);
        engine.reset();
        assert_eq!(engine.state(), QuizState::NotStarted);
    }

    #[test]
    fn start_replaces_an_active_attempt() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0, 0], 20));
        engine.select_answer(1).unwrap();
        engine.start(category(&[0, 0, 0], 40));
        let attempt = engine.attempt().unwrap();
        assert_eq!(attempt.answers(), &[None, None, None]);
        assert_eq!(attempt.remaining_secs(), 40);
    }

    #[test]
    fn review_is_only_available_after_completion() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[1, 0], 20));
        assert!(engine.attempt().unwrap().review().is_none());

        engine.select_answer(1).unwrap();
        engine.advance().unwrap();
        engine.select_answer(2).unwrap();
        engine.advance().unwrap();

        let review = engine.attempt().unwrap().review().unwrap();
        assert_eq!(review.len(), 2);
        assert!(review[0].is_correct);
        assert!(!review[1].is_correct);
        assert_eq!(review[1].chosen, Some(2));
        assert_eq!(review[1].question.explanation(), "why");
    }

    #[test]
    fn progress_counts_answered_slots() {
        let mut engine = QuizEngine::new();
        engine.start(category(&[0, 0, 0], 20));
        engine.select_answer(0).unwrap();
        engine.advance().unwrap();
        let progress = engine.attempt().unwrap().progress();
        assert_eq!(progress.current_index, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
    }
}
