//! Scheduling, listing and ending mock interview sessions.

use std::sync::Arc;

use prep_core::Clock;
use prep_core::model::{
    ChatTurn, InterviewEnd, InterviewSession, InterviewSetup, InterviewStatus, UserId,
};
use storage::repository::InterviewSessionRepository;

use crate::error::InterviewError;

#[derive(Clone)]
pub struct InterviewService {
    clock: Clock,
    repo: Arc<dyn InterviewSessionRepository>,
}

impl InterviewService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn InterviewSessionRepository>) -> Self {
        Self { clock, repo }
    }

    /// Store a new session in the `scheduled` state.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::Storage` if the session cannot be stored.
    pub async fn schedule(
        &self,
        user_id: &UserId,
        setup: &InterviewSetup,
    ) -> Result<InterviewSession, InterviewError> {
        let session = self
            .repo
            .create_interview(user_id, setup, self.clock.now())
            .await?;
        log::info!(
            "scheduled interview {} ({}) for {user_id}",
            session.id,
            setup.title()
        );
        Ok(session)
    }

    /// Mark a scheduled session as running.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::Storage` if the session is missing or already ended.
    pub async fn begin(&self, id: i64) -> Result<InterviewSession, InterviewError> {
        Ok(self
            .repo
            .set_interview_status(id, InterviewStatus::InProgress)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `InterviewError::Storage` if the session is missing or already ended.
    pub async fn cancel(&self, id: i64) -> Result<InterviewSession, InterviewError> {
        Ok(self
            .repo
            .set_interview_status(id, InterviewStatus::Cancelled)
            .await?)
    }

    /// Complete a session, storing how long it ran and what was said.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::Storage` if the session is missing or already ended.
    pub async fn end(
        &self,
        id: i64,
        elapsed_secs: u32,
        transcript: Vec<ChatTurn>,
    ) -> Result<InterviewSession, InterviewError> {
        let end = InterviewEnd {
            elapsed_secs,
            ended_at: self.clock.now(),
            transcript,
        };
        let session = self.repo.end_interview(id, &end).await?;
        log::info!(
            "interview {id} completed after {elapsed_secs}s with {} messages",
            session.transcript.len()
        );
        Ok(session)
    }

    /// A user's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::Storage` on backend failures.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<InterviewSession>, InterviewError> {
        Ok(self.repo.list_interviews(user_id).await?)
    }

    /// # Errors
    ///
    /// Returns `InterviewError::Storage` if the session is missing.
    pub async fn get(&self, id: i64) -> Result<InterviewSession, InterviewError> {
        Ok(self.repo.get_interview(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use prep_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, StorageError};

    fn service(clock: Clock) -> InterviewService {
        InterviewService::new(clock, Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn schedule_begin_end_records_clock_times() {
        let mut clock = fixed_clock();
        let svc = service(clock);
        let user = UserId::new("u1");
        let setup = InterviewSetup::new("Platform Engineer", "technical").unwrap();

        let session = svc.schedule(&user, &setup).await.unwrap();
        assert_eq!(session.created_at, fixed_now());
        assert_eq!(session.status, InterviewStatus::Scheduled);

        let running = svc.begin(session.id).await.unwrap();
        assert_eq!(running.status, InterviewStatus::InProgress);

        clock.advance(Duration::minutes(20));
        let svc = InterviewService::new(clock, Arc::clone(&svc.repo));
        let ended = svc
            .end(session.id, 1_200, vec![ChatTurn::assistant("Ready?")])
            .await
            .unwrap();
        assert_eq!(ended.status, InterviewStatus::Completed);
        assert_eq!(ended.ended_at, Some(fixed_now() + Duration::minutes(20)));
        assert_eq!(ended.elapsed_secs, Some(1_200));

        let listed = svc.list(&user).await.unwrap();
        assert_eq!(listed, vec![ended]);
    }

    #[tokio::test]
    async fn cancelled_session_cannot_be_ended() {
        let svc = service(fixed_clock());
        let setup = InterviewSetup::new("Designer", "portfolio").unwrap();
        let session = svc.schedule(&UserId::new("u1"), &setup).await.unwrap();
        svc.cancel(session.id).await.unwrap();

        let err = svc.end(session.id, 10, Vec::new()).await.unwrap_err();
        assert!(matches!(err, InterviewError::Storage(StorageError::Conflict)));
        assert_eq!(
            svc.get(session.id).await.unwrap().status,
            InterviewStatus::Cancelled
        );
    }
}
