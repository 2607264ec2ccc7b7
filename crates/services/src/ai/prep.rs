use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::client::TextGenerator;
use super::salvage::salvage_json_array;
use crate::error::AiError;

/// A likely interview question with a suggested answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepQuestion {
    pub question: String,
    #[serde(default)]
    pub suggested_answer: String,
    #[serde(default)]
    pub category: String,
}

/// Generates interview questions from a resume and a job description.
#[derive(Clone)]
pub struct PrepQuestionGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl PrepQuestionGenerator {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask the model for questions.
    ///
    /// Returns an empty list when the response holds no usable JSON array.
    ///
    /// # Errors
    ///
    /// Returns `AiError` if the model call fails.
    pub async fn generate(
        &self,
        resume: &str,
        job_description: &str,
    ) -> Result<Vec<PrepQuestion>, AiError> {
        let response = self
            .generator
            .generate(&question_prompt(resume, job_description))
            .await?;

        let Some(serde_json::Value::Array(items)) = salvage_json_array(&response) else {
            log::warn!("no question list found in AI response");
            return Ok(Vec::new());
        };

        // skip malformed entries instead of failing the whole list
        let questions: Vec<PrepQuestion> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .filter(|q: &PrepQuestion| !q.question.trim().is_empty())
            .collect();
        log::info!("generated {} interview questions", questions.len());
        Ok(questions)
    }
}

fn question_prompt(resume: &str, job_description: &str) -> String {
    format!(
        "Based on this resume and job description, generate 8-10 likely interview \
questions with suggested answers.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}

Return a JSON array of objects with this structure:
{{
  \"question\": \"The interview question\",
  \"suggestedAnswer\": \"A comprehensive suggested answer\",
  \"category\": \"Technical/Behavioral/Experience/Company-specific\"
}}

Focus on:
1. Technical skills mentioned in both resume and job description
2. Behavioral questions based on experience
3. Company-specific questions
4. Role-specific scenarios"
    )
}
