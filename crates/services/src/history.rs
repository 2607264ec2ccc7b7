use std::sync::Arc;

use prep_core::model::{CategoryId, QuizResult, UserId};
use storage::repository::{QuizResultRepository, QuizResultRow};

use crate::error::HistoryError;

/// Upper bound on rows pulled when aggregating stats.
const STATS_SCAN_LIMIT: u32 = 10_000;

/// Aggregate over a user's completed quizzes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizStats {
    pub total_attempts: u32,
    /// Mean score rounded half up; 0 without attempts.
    pub average_score: u8,
    pub best_score: u8,
    pub total_time_secs: u64,
    /// One entry per category, most recently played first.
    pub per_category: Vec<CategoryStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub category_id: CategoryId,
    pub title: String,
    pub attempts: u32,
    pub best_score: u8,
    pub latest_score: u8,
}

/// Read side of stored quiz results.
#[derive(Clone)]
pub struct QuizHistoryService {
    results: Arc<dyn QuizResultRepository>,
}

impl QuizHistoryService {
    #[must_use]
    pub fn new(results: Arc<dyn QuizResultRepository>) -> Self {
        Self { results }
    }

    /// Most recent results for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if storage fails.
    pub async fn recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, HistoryError> {
        Ok(self.results.list_results(user_id, limit).await?)
    }

    /// Totals and per-category breakdown for a user.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if storage fails.
    pub async fn stats(&self, user_id: &UserId) -> Result<QuizStats, HistoryError> {
        let rows = self.results.list_results(user_id, STATS_SCAN_LIMIT).await?;
        Ok(summarize(rows.iter().map(|row| &row.result)))
    }
}

/// Folds results given newest first into `QuizStats`.
fn summarize<'a>(results: impl Iterator<Item = &'a QuizResult>) -> QuizStats {
    let mut stats = QuizStats::default();
    let mut score_sum: u64 = 0;

    for result in results {
        stats.total_attempts += 1;
        score_sum += u64::from(result.score());
        stats.best_score = stats.best_score.max(result.score());
        stats.total_time_secs += u64::from(result.elapsed_secs());

        match stats
            .per_category
            .iter_mut()
            .find(|entry| &entry.category_id == result.category_id())
        {
            Some(entry) => {
                entry.attempts += 1;
                entry.best_score = entry.best_score.max(result.score());
            }
            None => stats.per_category.push(CategoryStats {
                category_id: result.category_id().clone(),
                title: result.category_title().to_string(),
                attempts: 1,
                best_score: result.score(),
                latest_score: result.score(),
            }),
        }
    }

    if stats.total_attempts > 0 {
        let n = u64::from(stats.total_attempts);
        let average = (score_sum * 2 + n) / (2 * n);
        stats.average_score = u8::try_from(average).unwrap_or(100);
    }
    stats
}
