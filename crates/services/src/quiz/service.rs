use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use prep_core::model::{Catalog, CategoryId, QuizCategory, QuizResult, UserId};
use prep_core::quiz::{QuizAttempt, QuizEngine, QuizOutcome, QuizState};

use super::submission::ResultSubmitter;
use super::view::{CategorySummary, QuizView};
use crate::error::QuizSessionError;
use crate::Clock;

/// Runs quiz attempts for one user and hands completed results to a submitter.
///
/// Submission is fire-and-forget: the result is scored and shown before the
/// submitter runs, and a failing submitter only produces a warning in the log.
pub struct QuizSessionService {
    clock: Clock,
    user_id: UserId,
    catalog: Arc<Catalog>,
    engine: QuizEngine,
    submitter: Arc<dyn ResultSubmitter>,
    last_result: Option<QuizResult>,
    pending: Vec<JoinHandle<()>>,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        user_id: UserId,
        catalog: Arc<Catalog>,
        submitter: Arc<dyn ResultSubmitter>,
    ) -> Self {
        Self {
            clock,
            user_id,
            catalog,
            engine: QuizEngine::new(),
            submitter,
            last_result: None,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn categories(&self) -> Vec<CategorySummary> {
        self.catalog
            .categories()
            .iter()
            .map(|category| CategorySummary::from_category(category))
            .collect()
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.engine.state()
    }

    #[must_use]
    pub fn attempt(&self) -> Option<&QuizAttempt> {
        self.engine.attempt()
    }

    #[must_use]
    pub fn view(&self) -> QuizView {
        QuizView::from_state(self.engine.state(), self.engine.attempt())
    }

    /// Result record of the most recently completed attempt.
    #[must_use]
    pub fn last_result(&self) -> Option<&QuizResult> {
        self.last_result.as_ref()
    }

    /// Start an attempt on a catalog category.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::UnknownCategory` if the id is not in the catalog.
    pub fn start(&mut self, category_id: &CategoryId) -> Result<&QuizAttempt, QuizSessionError> {
        let category = self
            .catalog
            .get(category_id)
            .ok_or_else(|| QuizSessionError::UnknownCategory(category_id.clone()))?;
        Ok(self.start_category(category))
    }

    /// Start an attempt on a category that need not come from the catalog.
    pub fn start_category(&mut self, category: Arc<QuizCategory>) -> &QuizAttempt {
        self.last_result = None;
        self.engine.start(category)
    }

    /// Record a choice for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Quiz` when no attempt is active or the index is
    /// out of range.
    pub fn select_answer(&mut self, option: usize) -> Result<(), QuizSessionError> {
        self.engine.select_answer(option)?;
        Ok(())
    }

    /// Move to the next question, completing the attempt after the last one.
    ///
    /// Returns the result record when this call completed the attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Quiz` when no attempt is active or the current
    /// question has no answer.
    pub fn advance(&mut self) -> Result<Option<QuizResult>, QuizSessionError> {
        let outcome = self.engine.advance()?;
        Ok(outcome.map(|outcome| self.finish(&outcome)))
    }

    /// One elapsed second of the countdown.
    ///
    /// Returns the result record when the countdown completed the attempt.
    pub fn tick(&mut self) -> Option<QuizResult> {
        let outcome = self.engine.tick()?;
        Some(self.finish(&outcome))
    }

    /// Return to category selection.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.last_result = None;
    }

    /// Wait for submissions spawned so far.
    ///
    /// Hosts call this before shutting down so queued results are not lost.
    pub async fn flush_submission(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(err) = handle.await {
                warn!("quiz result submission task failed: {err}");
            }
        }
    }

    fn finish(&mut self, outcome: &QuizOutcome) -> QuizResult {
        let result = QuizResult::from_outcome(self.user_id.clone(), outcome, self.clock.now());
        info!(
            "quiz {} finished for {}: {}/{} ({}%)",
            result.category_id(),
            result.user_id(),
            result.correct_answers(),
            result.total_questions(),
            result.score()
        );
        self.pending.retain(|handle| !handle.is_finished());
        self.submit_detached(result.clone());
        self.last_result = Some(result.clone());
        result
    }

    fn submit_detached(&mut self, result: QuizResult) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                "no async runtime available; quiz result for {} was not submitted",
                result.category_id()
            );
            return;
        };
        let submitter = Arc::clone(&self.submitter);
        let handle = runtime.spawn(async move {
            match submitter.submit(&result).await {
                Ok(()) => debug!("submitted quiz result for {}", result.category_id()),
                Err(err) => warn!(
                    "failed to submit quiz result for {}: {err}",
                    result.category_id()
                ),
            }
        });
        self.pending.push(handle);
    }
}
