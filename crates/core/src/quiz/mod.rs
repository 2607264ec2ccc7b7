//! Timed multiple-choice quiz engine.
//!
//! The engine is a plain state machine driven by discrete events: option
//! selection, advancing, and one `tick` per elapsed second supplied by whatever
//! scheduler the host owns. It never reads a clock and never performs I/O.

mod attempt;
mod engine;
mod scoring;

pub use attempt::{CompletionReason, QuestionReview, QuizAttempt, QuizOutcome, QuizProgress};
pub use engine::{QuizEngine, QuizError, QuizState};
pub use scoring::{count_correct, score_percent};
