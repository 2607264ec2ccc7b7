use prep_core::model::{
    CategoryId, ChatTurn, Difficulty, InterviewSession, InterviewSetup, InterviewStatus,
    QuizResult, UserId,
};
use sqlx::Row;

use crate::repository::{QuizResultRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn score_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid score: {v}")))
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizResult, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let category_id: String = row.try_get("category_id").map_err(ser)?;
    let category_title: String = row.try_get("category_title").map_err(ser)?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let correct_answers = u32_from_i64(
        "correct_answers",
        row.try_get::<i64, _>("correct_answers").map_err(ser)?,
    )?;
    let score = score_from_i64(row.try_get::<i64, _>("score").map_err(ser)?)?;
    let elapsed_secs = u32_from_i64(
        "elapsed_secs",
        row.try_get::<i64, _>("elapsed_secs").map_err(ser)?,
    )?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    QuizResult::from_persisted(
        UserId::new(user_id),
        CategoryId::new(category_id),
        category_title,
        total_questions,
        correct_answers,
        score,
        elapsed_secs,
        completed_at,
    )
    .map_err(ser)
}

pub(crate) fn map_result_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<QuizResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(QuizResultRow::new(id, map_result_row(row)?))
}

pub(crate) fn map_interview_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<InterviewSession, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let kind: String = row.try_get("kind").map_err(ser)?;
    let company: Option<String> = row.try_get("company").map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let planned_minutes = u32_from_i64(
        "planned_minutes",
        row.try_get::<i64, _>("planned_minutes").map_err(ser)?,
    )?;
    let status: InterviewStatus = row
        .try_get::<String, _>("status")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let job_description: Option<String> = row.try_get("job_description").map_err(ser)?;
    let transcript_json: String = row.try_get("transcript").map_err(ser)?;
    let transcript: Vec<ChatTurn> = serde_json::from_str(&transcript_json).map_err(ser)?;
    let elapsed_secs = row
        .try_get::<Option<i64>, _>("elapsed_secs")
        .map_err(ser)?
        .map(|v| u32_from_i64("elapsed_secs", v))
        .transpose()?;
    let created_at = row.try_get("created_at").map_err(ser)?;
    let ended_at = row.try_get("ended_at").map_err(ser)?;

    let setup = InterviewSetup::new(title, kind)
        .and_then(|s| s.with_planned_minutes(planned_minutes))
        .map_err(ser)?
        .with_company(company)
        .with_difficulty(difficulty)
        .with_job_description(job_description);

    Ok(InterviewSession {
        id,
        user_id: UserId::new(user_id),
        setup,
        status,
        created_at,
        ended_at,
        elapsed_secs,
        transcript,
    })
}

/// Lowercase label stored in the `difficulty` column.
pub(crate) fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}
