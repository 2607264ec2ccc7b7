use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::client::TextGenerator;
use super::salvage::salvage_json_object;
use crate::error::AiError;

const FALLBACK_SCORE: u8 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub overall_score: u8,
    #[serde(default)]
    pub sections: Vec<ResumeSection>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub keywords: KeywordReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSection {
    pub name: String,
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordReport {
    #[serde(default)]
    pub present: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl ResumeAnalysis {
    /// Generic analysis wrapping a response that could not be parsed.
    #[must_use]
    pub fn fallback(raw_response: &str) -> Self {
        Self {
            overall_score: FALLBACK_SCORE,
            sections: vec![ResumeSection {
                name: "Overall Analysis".into(),
                score: FALLBACK_SCORE,
                feedback: raw_response.to_string(),
                suggestions: vec!["Review the detailed feedback provided".into()],
            }],
            strengths: vec!["Professional presentation".into(), "Clear structure".into()],
            improvements: vec![
                "Add more quantified achievements".into(),
                "Optimize for ATS".into(),
            ],
            keywords: KeywordReport {
                present: vec!["professional".into(), "experience".into()],
                missing: vec!["specific technical skills".into()],
            },
        }
    }

    fn is_plausible(&self) -> bool {
        self.overall_score <= 100 && self.sections.iter().all(|s| s.score <= 100)
    }
}

/// Reviews a resume, optionally against a job description.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl ResumeAnalyzer {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask the model for a structured review.
    ///
    /// A response that is not a usable analysis yields [`ResumeAnalysis::fallback`].
    ///
    /// # Errors
    ///
    /// Returns `AiError` if the model call fails.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<ResumeAnalysis, AiError> {
        let response = self
            .generator
            .generate(&analysis_prompt(resume_text, job_description))
            .await?;

        let parsed = salvage_json_object(&response)
            .and_then(|value| serde_json::from_value::<ResumeAnalysis>(value).ok())
            .filter(ResumeAnalysis::is_plausible);

        Ok(parsed.unwrap_or_else(|| {
            log::warn!("resume analysis was not valid JSON; using fallback");
            ResumeAnalysis::fallback(&response)
        }))
    }
}

fn analysis_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    let comparison = job_description
        .filter(|jd| !jd.trim().is_empty())
        .map(|jd| format!("Job Description for comparison:\n{jd}\n\n"))
        .unwrap_or_default();
    let section = |name: &str| {
        format!(
            "    {{ \"name\": \"{name}\", \"score\": number (0-100), \"feedback\": \"detailed feedback\", \
\"suggestions\": [\"specific suggestion\"] }}"
        )
    };
    let sections = [
        "Contact Information",
        "Professional Summary",
        "Work Experience",
        "Skills",
        "Education",
    ]
    .map(section)
    .join(",\n");

    format!(
        "You are an expert resume reviewer and career coach. Analyze the following resume \
and provide detailed feedback.

Resume Content:
{resume_text}

{comparison}Respond with JSON in this format:
{{
  \"overallScore\": number (0-100),
  \"sections\": [
{sections}
  ],
  \"strengths\": [\"strength\"],
  \"improvements\": [\"improvement\"],
  \"keywords\": {{ \"present\": [\"keyword\"], \"missing\": [\"keyword\"] }}
}}

Focus on ATS compatibility, keyword optimization, quantified achievements, \
professional formatting and relevance to the job description if one is given."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn parses_structured_analysis() {
        let analyzer = ResumeAnalyzer::new(Arc::new(Canned(
            r#"```json
{
  "overallScore": 81,
  "sections": [{"name": "Skills", "score": 90, "feedback": "Strong", "suggestions": []}],
  "strengths": ["Rust"],
  "improvements": ["Quantify impact"],
  "keywords": {"present": ["tokio"], "missing": ["kubernetes"]}
}
```"#,
        )));
        let analysis = analyzer.analyze("resume", Some("jd")).await.unwrap();
        assert_eq!(analysis.overall_score, 81);
        assert_eq!(analysis.sections[0].name, "Skills");
        assert_eq!(analysis.keywords.missing, vec!["kubernetes".to_string()]);
    }

    #[tokio::test]
    async fn unparseable_response_falls_back() {
        let raw = "Your resume is solid but needs metrics.";
        let analyzer = ResumeAnalyzer::new(Arc::new(Canned(raw)));
        let analysis = analyzer.analyze("resume", None).await.unwrap();
        assert_eq!(analysis, ResumeAnalysis::fallback(raw));
        assert_eq!(analysis.overall_score, 75);
        assert_eq!(analysis.sections.len(), 1);
        assert_eq!(analysis.sections[0].feedback, raw);
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let analyzer = ResumeAnalyzer::new(Arc::new(Failing));
        assert!(matches!(
            analyzer.analyze("resume", None).await,
            Err(AiError::EmptyResponse)
        ));
    }

    #[test]
    fn prompt_mentions_job_description_only_when_given() {
        assert!(analysis_prompt("cv", Some("Rust role")).contains("Rust role"));
        assert!(!analysis_prompt("cv", None).contains("Job Description for comparison"));
    }
}
