use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use prep_core::model::{
    Catalog, CategoryId, Difficulty, Question, QuestionId, QuizCategory, QuizResult, UserId,
};
use prep_core::quiz::QuizState;
use prep_core::time::fixed_clock;
use services::quiz::{QuizSessionService, QuizView, RepositorySubmitter, ResultSubmitter};
use services::{QuizHistoryService, SubmitError};
use storage::repository::{InMemoryRepository, StorageError};

/// Submitter that always fails, counting how often it was called.
#[derive(Default)]
struct BrokenSubmitter {
    calls: AtomicUsize,
}

#[async_trait]
impl ResultSubmitter for BrokenSubmitter {
    async fn submit(&self, _result: &QuizResult) -> Result<(), SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SubmitError::Storage(StorageError::Connection(
            "database is down".into(),
        )))
    }
}

fn three_question_category(time_limit_secs: u32) -> Arc<QuizCategory> {
    let questions = [1, 1, 0]
        .into_iter()
        .enumerate()
        .map(|(i, correct)| {
            Question::new(
                QuestionId::new(u32::try_from(i).unwrap() + 1),
                format!("Question {}", i + 1),
                vec!["first".into(), "second".into(), "third".into()],
                correct,
                "",
            )
            .unwrap()
        })
        .collect();
    Arc::new(
        QuizCategory::new(
            CategoryId::new("sample"),
            "Sample",
            "Three questions",
            Difficulty::Easy,
            questions,
            time_limit_secs,
        )
        .unwrap(),
    )
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().unwrap())
}

#[tokio::test]
async fn failed_submission_keeps_completed_score() {
    let submitter = Arc::new(BrokenSubmitter::default());
    let mut session = QuizSessionService::new(
        fixed_clock(),
        UserId::new("user_1"),
        catalog(),
        submitter.clone(),
    );

    session.start_category(three_question_category(60));
    let mut completion = None;
    for answer in [1, 0, 0] {
        session.select_answer(answer).unwrap();
        completion = session.advance().unwrap();
    }
    let result = completion.expect("final advance completes the attempt");
    assert_eq!(result.correct_answers(), 2);
    assert_eq!(result.score(), 67);

    session.flush_submission().await;
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

    assert_eq!(session.state(), QuizState::Completed);
    let QuizView::Completed(outcome) = session.view() else {
        panic!("expected completed view");
    };
    assert_eq!(outcome.score, 67);
    assert_eq!(session.last_result(), Some(&result));

    // nothing the host does afterwards triggers another submission
    assert!(session.tick().is_none());
    assert!(session.select_answer(0).is_err());
    session.flush_submission().await;
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timed_out_attempt_is_stored() {
    let repo = InMemoryRepository::new();
    let results = Arc::new(repo.clone());
    let mut session = QuizSessionService::new(
        fixed_clock(),
        UserId::new("user_1"),
        catalog(),
        Arc::new(RepositorySubmitter::new(results.clone())),
    );

    session.start_category(three_question_category(10));
    session.select_answer(1).unwrap();
    let mut completion = None;
    for _ in 0..10 {
        assert!(completion.is_none());
        completion = session.tick();
    }
    let result = completion.expect("tenth tick completes the attempt");
    assert_eq!(result.elapsed_secs(), 10);
    assert_eq!(result.correct_answers(), 1);
    assert_eq!(result.score(), 33);
    session.flush_submission().await;

    let history = QuizHistoryService::new(results);
    let recent = history.recent(&UserId::new("user_1"), 5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].result, result);
}

#[tokio::test]
async fn advancing_without_answer_is_rejected() {
    let mut session = QuizSessionService::new(
        fixed_clock(),
        UserId::new("user_1"),
        catalog(),
        Arc::new(BrokenSubmitter::default()),
    );
    session.start(&CategoryId::new("database")).unwrap();

    let err = session.advance().unwrap_err();
    assert_eq!(err.to_string(), "no answer selected");
    let QuizView::Active(view) = session.view() else {
        panic!("expected active view");
    };
    assert_eq!(view.question_index, 0);
    assert_eq!(view.counter(), "1 / 10");
    assert_eq!(view.remaining_display, "30:00");
}
