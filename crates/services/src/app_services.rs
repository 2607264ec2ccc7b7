use std::sync::Arc;

use prep_core::model::{Catalog, UserId};
use storage::repository::Storage;

use crate::ai::{
    AiClient, CareerCoach, InterviewChat, InterviewContext, PrepQuestionGenerator, ResumeAnalyzer,
    TextGenerator,
};
use crate::error::AppServicesError;
use crate::history::QuizHistoryService;
use crate::interviews::InterviewService;
use crate::question_bank::QuestionBankService;
use crate::quiz::{HttpSubmitter, QuizSessionService, RepositorySubmitter, ResultSubmitter};
use crate::Clock;

/// Assembles app-facing services around one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    user_id: UserId,
    catalog: Arc<Catalog>,
    submitter: Arc<dyn ResultSubmitter>,
    history: Arc<QuizHistoryService>,
    interviews: Arc<InterviewService>,
    question_bank: Arc<QuestionBankService>,
    ai: Arc<AiClient>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Results are written straight to the database unless `submit_url` is given,
    /// in which case they are POSTed to that server instead.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage, the catalog or the HTTP client
    /// cannot be initialised.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        user_id: UserId,
        submit_url: Option<&str>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, user_id, submit_url)
    }

    /// Build services over an existing storage aggregate.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog or the HTTP client cannot be
    /// initialised.
    pub fn from_storage(
        storage: Storage,
        clock: Clock,
        user_id: UserId,
        submit_url: Option<&str>,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::builtin()?);
        let submitter: Arc<dyn ResultSubmitter> = match submit_url {
            Some(url) => {
                let http = HttpSubmitter::new(url)?;
                log::info!("submitting quiz results to {}", http.endpoint());
                Arc::new(http)
            }
            None => Arc::new(RepositorySubmitter::new(Arc::clone(&storage.results))),
        };

        Ok(Self {
            clock,
            user_id,
            history: Arc::new(QuizHistoryService::new(Arc::clone(&storage.results))),
            interviews: Arc::new(InterviewService::new(
                clock,
                Arc::clone(&storage.interviews),
            )),
            question_bank: Arc::new(QuestionBankService::new(Arc::clone(&catalog))),
            catalog,
            submitter,
            ai: Arc::new(AiClient::from_env()),
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// A fresh quiz session for the configured user.
    #[must_use]
    pub fn quiz_session(&self) -> QuizSessionService {
        QuizSessionService::new(
            self.clock,
            self.user_id.clone(),
            Arc::clone(&self.catalog),
            Arc::clone(&self.submitter),
        )
    }

    #[must_use]
    pub fn history(&self) -> Arc<QuizHistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn interviews(&self) -> Arc<InterviewService> {
        Arc::clone(&self.interviews)
    }

    #[must_use]
    pub fn question_bank(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.question_bank)
    }

    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.ai.enabled()
    }

    #[must_use]
    pub fn prep_questions(&self) -> PrepQuestionGenerator {
        PrepQuestionGenerator::new(self.text_generator())
    }

    #[must_use]
    pub fn resume_analyzer(&self) -> ResumeAnalyzer {
        ResumeAnalyzer::new(self.text_generator())
    }

    #[must_use]
    pub fn career_coach(&self) -> CareerCoach {
        CareerCoach::new(self.text_generator())
    }

    #[must_use]
    pub fn interview_chat(&self, context: InterviewContext) -> InterviewChat {
        InterviewChat::new(self.text_generator(), context)
    }

    fn text_generator(&self) -> Arc<dyn TextGenerator> {
        Arc::clone(&self.ai) as Arc<dyn TextGenerator>
    }
}
