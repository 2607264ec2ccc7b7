use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Difficulty, UserId};

/// Planned length of a mock interview when none is given.
pub const DEFAULT_INTERVIEW_MINUTES: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InterviewSetupError {
    #[error("interview title cannot be empty")]
    EmptyTitle,

    #[error("interview type cannot be empty")]
    EmptyKind,

    #[error("planned duration must be > 0 minutes")]
    ZeroDuration,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a mock interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled sessions accept no further changes.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(
            self,
            InterviewStatus::Completed | InterviewStatus::Cancelled
        )
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown interview status: {raw}")]
pub struct ParseInterviewStatusError {
    raw: String,
}

impl FromStr for InterviewStatus {
    type Err = ParseInterviewStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "in_progress" => Ok(InterviewStatus::InProgress),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            _ => Err(ParseInterviewStatusError { raw: s.to_string() }),
        }
    }
}

//
// ─── TRANSCRIPT ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The candidate.
    User,
    /// The AI interviewer or coach.
    Assistant,
}

/// One message of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

//
// ─── SETUP ─────────────────────────────────────────────────────────────────────
//

/// What the candidate asked for when scheduling a mock interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSetup {
    title: String,
    kind: String,
    company: Option<String>,
    difficulty: Difficulty,
    planned_minutes: u32,
    job_description: Option<String>,
}

impl InterviewSetup {
    /// Creates a setup with medium difficulty and the default duration.
    ///
    /// # Errors
    ///
    /// Returns `InterviewSetupError` if the title or type is blank.
    pub fn new(
        title: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<Self, InterviewSetupError> {
        let title = title.into();
        let kind = kind.into();
        if title.trim().is_empty() {
            return Err(InterviewSetupError::EmptyTitle);
        }
        if kind.trim().is_empty() {
            return Err(InterviewSetupError::EmptyKind);
        }
        Ok(Self {
            title,
            kind,
            company: None,
            difficulty: Difficulty::Medium,
            planned_minutes: DEFAULT_INTERVIEW_MINUTES,
            job_description: None,
        })
    }

    /// Blank values are treated as absent.
    #[must_use]
    pub fn with_company(mut self, company: Option<String>) -> Self {
        self.company = company.filter(|c| !c.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// # Errors
    ///
    /// Returns `InterviewSetupError::ZeroDuration` for a zero-minute plan.
    pub fn with_planned_minutes(mut self, minutes: u32) -> Result<Self, InterviewSetupError> {
        if minutes == 0 {
            return Err(InterviewSetupError::ZeroDuration);
        }
        self.planned_minutes = minutes;
        Ok(self)
    }

    /// Blank values are treated as absent.
    #[must_use]
    pub fn with_job_description(mut self, job_description: Option<String>) -> Self {
        self.job_description = job_description.filter(|jd| !jd.trim().is_empty());
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Interview type, e.g. `technical` or `behavioral`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn planned_minutes(&self) -> u32 {
        self.planned_minutes
    }

    #[must_use]
    pub fn job_description(&self) -> Option<&str> {
        self.job_description.as_deref()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A stored mock interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSession {
    pub id: i64,
    pub user_id: UserId,
    pub setup: InterviewSetup,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds actually spent, recorded when the session ends.
    pub elapsed_secs: Option<u32>,
    pub transcript: Vec<ChatTurn>,
}

/// How a session finished, as recorded by `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewEnd {
    pub elapsed_secs: u32,
    pub ended_at: DateTime<Utc>,
    pub transcript: Vec<ChatTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_defaults_and_validation() {
        let setup = InterviewSetup::new("Backend Engineer", "technical").unwrap();
        assert_eq!(setup.difficulty(), Difficulty::Medium);
        assert_eq!(setup.planned_minutes(), 30);
        assert_eq!(setup.company(), None);

        assert_eq!(
            InterviewSetup::new("  ", "technical").unwrap_err(),
            InterviewSetupError::EmptyTitle
        );
        assert_eq!(
            InterviewSetup::new("Backend Engineer", "").unwrap_err(),
            InterviewSetupError::EmptyKind
        );
        assert_eq!(
            setup.with_planned_minutes(0).unwrap_err(),
            InterviewSetupError::ZeroDuration
        );
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let setup = InterviewSetup::new("SRE", "behavioral")
            .unwrap()
            .with_company(Some(" ".into()))
            .with_job_description(Some("Run the fleet".into()));
        assert_eq!(setup.company(), None);
        assert_eq!(setup.job_description(), Some("Run the fleet"));
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            InterviewStatus::Scheduled,
            InterviewStatus::InProgress,
            InterviewStatus::Completed,
            InterviewStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<InterviewStatus>().unwrap(), status);
        }
        assert!("done".parse::<InterviewStatus>().is_err());
        assert!(InterviewStatus::Completed.is_final());
        assert!(!InterviewStatus::InProgress.is_final());
    }

    #[test]
    fn transcript_serializes_with_role_names() {
        let json = serde_json::to_string(&[ChatTurn::assistant("Hi"), ChatTurn::user("Hello")])
            .unwrap();
        assert_eq!(
            json,
            r#"[{"role":"assistant","content":"Hi"},{"role":"user","content":"Hello"}]"#
        );
    }
}
