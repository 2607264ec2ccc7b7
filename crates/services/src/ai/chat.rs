use std::sync::Arc;

use prep_core::model::{ChatTurn, Difficulty, InterviewSetup};

use super::client::TextGenerator;
use crate::error::AiError;

/// Company named in interviewer prompts when the session has none.
const UNNAMED_COMPANY: &str = "a leading company";

/// One-shot career advice.
#[derive(Clone)]
pub struct CareerCoach {
    generator: Arc<dyn TextGenerator>,
}

impl CareerCoach {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Answer a single career question.
    ///
    /// # Errors
    ///
    /// Returns `AiError::EmptyMessage` for a blank question, or the model error.
    pub async fn ask(&self, message: &str) -> Result<String, AiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AiError::EmptyMessage);
        }
        self.generator.generate(&coach_prompt(message)).await
    }
}

fn coach_prompt(message: &str) -> String {
    format!(
        "You are an experienced career coach and professional mentor with expertise in:
- Career planning and development
- Interview preparation and techniques
- Resume optimization and personal branding
- Skill development and learning paths
- Industry insights and trends
- Professional networking
- Salary negotiation
- Work-life balance

Your role:
- Provide actionable, personalized career advice
- Be supportive, encouraging, and professional
- Ask clarifying questions when needed
- Offer specific examples and strategies
- Keep responses comprehensive but focused
- Adapt advice to different career levels and industries

User question: \"{message}\"

Provide helpful career coaching advice. Be specific and actionable in your response."
    )
}

/// Who the interviewer is hiring for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewContext {
    pub job_role: String,
    pub company: String,
    pub difficulty: Difficulty,
}

impl InterviewContext {
    /// The session title doubles as the job role.
    #[must_use]
    pub fn from_setup(setup: &InterviewSetup) -> Self {
        Self {
            job_role: setup.title().to_string(),
            company: setup.company().unwrap_or(UNNAMED_COMPANY).to_string(),
            difficulty: setup.difficulty(),
        }
    }
}

/// A mock interview conversation.
///
/// Starts with the interviewer's greeting; every candidate message is answered
/// by one interviewer turn.
pub struct InterviewChat {
    generator: Arc<dyn TextGenerator>,
    context: InterviewContext,
    transcript: Vec<ChatTurn>,
}

impl InterviewChat {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, context: InterviewContext) -> Self {
        let greeting = format!(
            "Hello! I'm your AI interviewer for the {} position at {}. I'm excited to conduct \
this {} level interview with you today. Are you ready to begin?",
            context.job_role,
            context.company,
            context.difficulty.to_string().to_lowercase()
        );
        Self {
            generator,
            context,
            transcript: vec![ChatTurn::assistant(greeting)],
        }
    }

    #[must_use]
    pub fn context(&self) -> &InterviewContext {
        &self.context
    }

    /// The interviewer's opening line.
    #[must_use]
    pub fn greeting(&self) -> &str {
        self.transcript
            .first()
            .map_or("", |turn| turn.content.as_str())
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    #[must_use]
    pub fn into_transcript(self) -> Vec<ChatTurn> {
        self.transcript
    }

    /// Record the candidate's answer and get the interviewer's next turn.
    ///
    /// The candidate turn stays in the transcript even if the model call fails.
    ///
    /// # Errors
    ///
    /// Returns `AiError::EmptyMessage` for a blank answer, or the model error.
    pub async fn reply(&mut self, message: &str) -> Result<&str, AiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AiError::EmptyMessage);
        }
        self.transcript.push(ChatTurn::user(message));

        let response = self
            .generator
            .generate(&interviewer_prompt(&self.context, message))
            .await?;
        self.transcript.push(ChatTurn::assistant(response));
        Ok(self
            .transcript
            .last()
            .map_or("", |turn| turn.content.as_str()))
    }
}

fn interviewer_prompt(context: &InterviewContext, message: &str) -> String {
    let difficulty = context.difficulty.to_string().to_lowercase();
    format!(
        "You are an experienced technical interviewer conducting a {difficulty} level \
interview for a {} position at {}.

Your role:
- Ask relevant technical and behavioral questions
- Provide constructive feedback
- Be professional but friendly
- Adapt questions based on candidate responses
- Keep responses concise and focused

Current candidate response: \"{message}\"

Respond as the interviewer would, asking follow-up questions or providing the next \
interview question. Keep your response under 150 words.",
        context.job_role, context.company
    )
}
