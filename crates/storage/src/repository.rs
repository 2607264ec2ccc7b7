use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prep_core::model::{
    InterviewEnd, InterviewSession, InterviewSetup, InterviewStatus, QuizResult, UserId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted quiz result together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultRow {
    pub id: i64,
    pub result: QuizResult,
}

impl QuizResultRow {
    #[must_use]
    pub fn new(id: i64, result: QuizResult) -> Self {
        Self { id, result }
    }
}

/// Repository contract for completed quiz results.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Append a completed result and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &QuizResult) -> Result<i64, StorageError>;

    /// Fetch a result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: i64) -> Result<QuizResult, StorageError>;

    /// List a user's results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError>;
}

/// Repository contract for mock interview sessions.
#[async_trait]
pub trait InterviewSessionRepository: Send + Sync {
    /// Store a newly scheduled session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn create_interview(
        &self,
        user_id: &UserId,
        setup: &InterviewSetup,
        created_at: DateTime<Utc>,
    ) -> Result<InterviewSession, StorageError>;

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_interview(&self, id: i64) -> Result<InterviewSession, StorageError>;

    /// List a user's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_interviews(&self, user_id: &UserId)
    -> Result<Vec<InterviewSession>, StorageError>;

    /// Move a session to `status`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing and `StorageError::Conflict`
    /// if the session already ended.
    async fn set_interview_status(
        &self,
        id: i64,
        status: InterviewStatus,
    ) -> Result<InterviewSession, StorageError>;

    /// Mark a session completed with its duration and transcript.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing and `StorageError::Conflict`
    /// if the session already ended.
    async fn end_interview(
        &self,
        id: i64,
        end: &InterviewEnd,
    ) -> Result<InterviewSession, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    results: Arc<Mutex<BTreeMap<i64, QuizResult>>>,
    interviews: Arc<Mutex<BTreeMap<i64, InterviewSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.keys().next_back().map_or(1, |last| last + 1);
        guard.insert(id, result.clone());
        Ok(id)
    }

    async fn get_result(&self, id: i64) -> Result<QuizResult, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<QuizResultRow> = guard
            .iter()
            .filter(|(_, r)| r.user_id() == user_id)
            .map(|(id, r)| QuizResultRow::new(*id, r.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait]
impl InterviewSessionRepository for InMemoryRepository {
    async fn create_interview(
        &self,
        user_id: &UserId,
        setup: &InterviewSetup,
        created_at: DateTime<Utc>,
    ) -> Result<InterviewSession, StorageError> {
        let mut guard = self
            .interviews
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.keys().next_back().map_or(1, |last| last + 1);
        let session = InterviewSession {
            id,
            user_id: user_id.clone(),
            setup: setup.clone(),
            status: InterviewStatus::Scheduled,
            created_at,
            ended_at: None,
            elapsed_secs: None,
            transcript: Vec::new(),
        };
        guard.insert(id, session.clone());
        Ok(session)
    }

    async fn get_interview(&self, id: i64) -> Result<InterviewSession, StorageError> {
        let guard = self
            .interviews
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_interviews(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let guard = self
            .interviews
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut sessions: Vec<InterviewSession> = guard
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    async fn set_interview_status(
        &self,
        id: i64,
        status: InterviewStatus,
    ) -> Result<InterviewSession, StorageError> {
        let mut guard = self
            .interviews
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let session = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        if session.status.is_final() {
            return Err(StorageError::Conflict);
        }
        session.status = status;
        Ok(session.clone())
    }

    async fn end_interview(
        &self,
        id: i64,
        end: &InterviewEnd,
    ) -> Result<InterviewSession, StorageError> {
        let mut guard = self
            .interviews
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let session = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        if session.status.is_final() {
            return Err(StorageError::Conflict);
        }
        session.status = InterviewStatus::Completed;
        session.ended_at = Some(end.ended_at);
        session.elapsed_secs = Some(end.elapsed_secs);
        session.transcript.clone_from(&end.transcript);
        Ok(session.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn QuizResultRepository>,
    pub interviews: Arc<dyn InterviewSessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let results: Arc<dyn QuizResultRepository> = repo.clone();
        let interviews: Arc<dyn InterviewSessionRepository> = repo;
        Self {
            results,
            interviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use prep_core::model::{CategoryId, ChatTurn};
    use prep_core::time::fixed_now;

    fn result(user: &str, score: u8, minutes_ago: i64) -> QuizResult {
        QuizResult::from_persisted(
            UserId::new(user),
            CategoryId::new("coding"),
            "Coding & Programming".into(),
            10,
            u32::from(score / 10),
            score,
            600,
            fixed_now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn appends_and_fetches_by_id() {
        let repo = InMemoryRepository::new();
        let first = repo.append_result(&result("u1", 70, 0)).await.unwrap();
        let second = repo.append_result(&result("u1", 80, 0)).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let fetched = repo.get_result(second).await.unwrap();
        assert_eq!(fetched.score(), 80);
        assert!(matches!(
            repo.get_result(99).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn lists_newest_first_for_one_user() {
        let repo = InMemoryRepository::new();
        repo.append_result(&result("u1", 10, 30)).await.unwrap();
        repo.append_result(&result("u2", 20, 0)).await.unwrap();
        repo.append_result(&result("u1", 30, 5)).await.unwrap();
        repo.append_result(&result("u1", 40, 60)).await.unwrap();

        let rows = repo.list_results(&UserId::new("u1"), 10).await.unwrap();
        let scores: Vec<u8> = rows.iter().map(|r| r.result.score()).collect();
        assert_eq!(scores, vec![30, 10, 40]);

        let limited = repo.list_results(&UserId::new("u1"), 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    fn setup(title: &str) -> InterviewSetup {
        InterviewSetup::new(title, "technical").unwrap()
    }

    #[tokio::test]
    async fn interviews_list_newest_first_per_user() {
        let repo = InMemoryRepository::new();
        let u1 = UserId::new("u1");
        let older = repo
            .create_interview(&u1, &setup("Backend"), fixed_now() - Duration::days(1))
            .await
            .unwrap();
        repo.create_interview(&UserId::new("u2"), &setup("Other"), fixed_now())
            .await
            .unwrap();
        let newer = repo
            .create_interview(&u1, &setup("Frontend"), fixed_now())
            .await
            .unwrap();

        assert_eq!(older.status, InterviewStatus::Scheduled);
        let ids: Vec<i64> = repo
            .list_interviews(&u1)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn ending_records_transcript_once() {
        let repo = InMemoryRepository::new();
        let session = repo
            .create_interview(&UserId::new("u1"), &setup("Backend"), fixed_now())
            .await
            .unwrap();
        repo.set_interview_status(session.id, InterviewStatus::InProgress)
            .await
            .unwrap();

        let end = InterviewEnd {
            elapsed_secs: 754,
            ended_at: fixed_now() + Duration::minutes(13),
            transcript: vec![ChatTurn::assistant("Ready?"), ChatTurn::user("Yes")],
        };
        let ended = repo.end_interview(session.id, &end).await.unwrap();
        assert_eq!(ended.status, InterviewStatus::Completed);
        assert_eq!(ended.elapsed_secs, Some(754));
        assert_eq!(ended.transcript.len(), 2);

        assert!(matches!(
            repo.end_interview(session.id, &end).await,
            Err(StorageError::Conflict)
        ));
        assert!(matches!(
            repo.set_interview_status(session.id, InterviewStatus::Cancelled)
                .await,
            Err(StorageError::Conflict)
        ));
        assert!(matches!(
            repo.get_interview(99).await,
            Err(StorageError::NotFound)
        ));
    }
}
