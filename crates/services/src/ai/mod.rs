//! Model-backed helpers for interview prep: question generation, resume review,
//! career coaching and mock interviews.

mod chat;
mod client;
mod prep;
mod resume;
mod salvage;

pub use chat::{CareerCoach, InterviewChat, InterviewContext};
pub use client::{AiClient, AiConfig, TextGenerator};
pub use prep::{PrepQuestion, PrepQuestionGenerator};
pub use resume::{KeywordReport, ResumeAnalysis, ResumeAnalyzer, ResumeSection};
pub use salvage::{salvage_json_array, salvage_json_object};
