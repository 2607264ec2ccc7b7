use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use prep_core::model::QuizResult;
use storage::repository::QuizResultRepository;

use crate::error::SubmitError;

/// Delivers a completed quiz result to the persistence collaborator.
#[async_trait]
pub trait ResultSubmitter: Send + Sync {
    /// Submit one result.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` when the collaborator rejects the result or cannot
    /// be reached.
    async fn submit(&self, result: &QuizResult) -> Result<(), SubmitError>;
}

/// Wire payload for the quiz-completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub user_id: String,
    pub category: String,
    pub title: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u8,
    pub time_taken: u32,
}

impl QuizSubmission {
    #[must_use]
    pub fn from_result(result: &QuizResult) -> Self {
        Self {
            user_id: result.user_id().to_string(),
            category: result.category_id().to_string(),
            title: result.category_title().to_string(),
            total_questions: result.total_questions(),
            correct_answers: result.correct_answers(),
            score: result.score(),
            time_taken: result.elapsed_secs(),
        }
    }
}

/// Writes results straight into a `QuizResultRepository`.
#[derive(Clone)]
pub struct RepositorySubmitter {
    results: Arc<dyn QuizResultRepository>,
}

impl RepositorySubmitter {
    #[must_use]
    pub fn new(results: Arc<dyn QuizResultRepository>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl ResultSubmitter for RepositorySubmitter {
    async fn submit(&self, result: &QuizResult) -> Result<(), SubmitError> {
        let id = self.results.append_result(result).await?;
        log::debug!("stored quiz result {id} for {}", result.user_id());
        Ok(())
    }
}

/// POSTs results as JSON to `{base_url}/api/quiz/complete`.
#[derive(Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Build a submitter for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Build a submitter around an already configured client.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/quiz/complete", base_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResultSubmitter for HttpSubmitter {
    async fn submit(&self, result: &QuizResult) -> Result<(), SubmitError> {
        let payload = QuizSubmission::from_result(result);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubmitError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::{CategoryId, UserId};
    use prep_core::time::fixed_now;
    use storage::repository::InMemoryRepository;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one request, answers with `status_line` and yields the raw request.
    async fn serve_once(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0_u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let response =
                format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base_url, handle)
    }

    fn local_submitter(base_url: &str) -> HttpSubmitter {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpSubmitter::with_client(client, base_url)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        body.len() >= length
    }

    fn result() -> QuizResult {
        QuizResult::from_persisted(
            UserId::new("user_42"),
            CategoryId::new("data-science"),
            "Data Science & Analytics".into(),
            10,
            7,
            70,
            912,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn submission_uses_camel_case_keys() {
        let json = serde_json::to_value(QuizSubmission::from_result(&result())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "user_42",
                "category": "data-science",
                "title": "Data Science & Analytics",
                "totalQuestions": 10,
                "correctAnswers": 7,
                "score": 70,
                "timeTaken": 912
            })
        );
    }

    #[test]
    fn http_endpoint_joins_base_url() {
        let submitter = HttpSubmitter::new("https://prep.example.com/").unwrap();
        assert_eq!(
            submitter.endpoint(),
            "https://prep.example.com/api/quiz/complete"
        );
    }

    #[tokio::test]
    async fn repository_submitter_appends() {
        let repo = InMemoryRepository::new();
        let submitter = RepositorySubmitter::new(Arc::new(repo.clone()));
        submitter.submit(&result()).await.unwrap();

        let rows = repo.list_results(&UserId::new("user_42"), 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result, result());
    }

    #[tokio::test]
    async fn http_submitter_posts_payload() {
        let (base_url, server) = serve_once("200 OK").await;
        let submitter = local_submitter(&base_url);
        submitter.submit(&result()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/quiz/complete HTTP/1.1"));
        assert!(request.contains("\"timeTaken\":912"));
    }

    #[tokio::test]
    async fn http_submitter_reports_server_errors() {
        let (base_url, server) = serve_once("500 Internal Server Error").await;
        let submitter = local_submitter(&base_url);
        let err = submitter.submit(&result()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::HttpStatus(status) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        server.await.unwrap();
    }
}
