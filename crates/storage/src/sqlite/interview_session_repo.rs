use chrono::{DateTime, Utc};
use prep_core::model::{InterviewEnd, InterviewSession, InterviewSetup, InterviewStatus, UserId};

use super::SqliteRepository;
use super::mapping::{difficulty_label, map_interview_row, ser};
use crate::repository::{InterviewSessionRepository, StorageError};

const SELECT_INTERVIEW: &str = r"
    SELECT
        id, user_id, title, kind, company, difficulty, planned_minutes, status,
        job_description, transcript, elapsed_secs, created_at, ended_at
    FROM interview_sessions
";

impl SqliteRepository {
    /// Rejects changes to sessions that already ended.
    async fn ensure_open(&self, id: i64) -> Result<(), StorageError> {
        let session = self.get_interview(id).await?;
        if session.status.is_final() {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InterviewSessionRepository for SqliteRepository {
    async fn create_interview(
        &self,
        user_id: &UserId,
        setup: &InterviewSetup,
        created_at: DateTime<Utc>,
    ) -> Result<InterviewSession, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO interview_sessions (
                    user_id, title, kind, company, difficulty, planned_minutes,
                    status, job_description, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(user_id.as_str())
        .bind(setup.title())
        .bind(setup.kind())
        .bind(setup.company())
        .bind(difficulty_label(setup.difficulty()))
        .bind(i64::from(setup.planned_minutes()))
        .bind(InterviewStatus::Scheduled.as_str())
        .bind(setup.job_description())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        self.get_interview(res.last_insert_rowid()).await
    }

    async fn get_interview(&self, id: i64) -> Result<InterviewSession, StorageError> {
        let row = sqlx::query(&format!("{SELECT_INTERVIEW} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        map_interview_row(&row)
    }

    async fn list_interviews(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_INTERVIEW} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_interview_row(&row)?);
        }
        Ok(out)
    }

    async fn set_interview_status(
        &self,
        id: i64,
        status: InterviewStatus,
    ) -> Result<InterviewSession, StorageError> {
        self.ensure_open(id).await?;
        sqlx::query("UPDATE interview_sessions SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        self.get_interview(id).await
    }

    async fn end_interview(
        &self,
        id: i64,
        end: &InterviewEnd,
    ) -> Result<InterviewSession, StorageError> {
        self.ensure_open(id).await?;
        let transcript = serde_json::to_string(&end.transcript).map_err(ser)?;
        sqlx::query(
            r"
                UPDATE interview_sessions
                SET status = ?1, elapsed_secs = ?2, ended_at = ?3, transcript = ?4
                WHERE id = ?5
            ",
        )
        .bind(InterviewStatus::Completed.as_str())
        .bind(i64::from(end.elapsed_secs))
        .bind(end.ended_at)
        .bind(transcript)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        self.get_interview(id).await
    }
}
