use std::time::Duration;

use prep_core::model::CategoryId;
use prep_core::quiz::QuizAttempt;
use services::quiz::{ActiveQuestionView, CategorySummary, QuizSessionService, QuizView};
use tokio::time::{Instant, MissedTickBehavior};

use crate::input::InputLines;

/// What the user typed during an active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Choose(usize),
    Next,
    Time,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" | "n" | "next" => return Self::Next,
            "t" | "time" => return Self::Time,
            "q" | "quit" => return Self::Quit,
            _ => {}
        }
        let mut chars = line.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if letter.is_ascii_lowercase() || letter.is_ascii_uppercase() {
                let offset = letter.to_ascii_lowercase() as u8 - b'a';
                return Self::Choose(usize::from(offset));
            }
        }
        line.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map_or(Self::Unknown, Self::Choose)
    }
}

/// Runs one interactive quiz.
///
/// The countdown ticker and user input are polled from a single `select!`, so
/// every mutation of the session happens on this task.
pub async fn run(
    session: &mut QuizSessionService,
    category: Option<CategoryId>,
    lines: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = match category {
        Some(id) => id,
        None => match pick_category(&session.categories(), lines).await {
            Some(id) => id,
            None => return Ok(()),
        },
    };
    let attempt = session.start(&category)?;
    print_intro(attempt);
    print_question(&session.view());

    let period = Duration::from_secs(1);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if session.tick().is_some() {
                    println!();
                    println!("Time's up!");
                    break;
                }
                if let QuizView::Active(view) = session.view() {
                    if should_announce(view.remaining_secs) {
                        println!("  [{} remaining]", view.remaining_display);
                    }
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    log::info!("stdin closed; abandoning quiz");
                    session.reset();
                    return Ok(());
                };
                match Input::parse(&line) {
                    Input::Choose(option) => match session.select_answer(option) {
                        Ok(()) => print_question(&session.view()),
                        Err(err) => println!("  {err}"),
                    },
                    Input::Next => match session.advance() {
                        Ok(Some(_)) => break,
                        Ok(None) => print_question(&session.view()),
                        Err(err) => println!("  {err}"),
                    },
                    Input::Time => {
                        if let QuizView::Active(view) = session.view() {
                            println!("  {} remaining", view.remaining_display);
                        }
                    }
                    Input::Quit => {
                        session.reset();
                        println!("Quiz abandoned.");
                        return Ok(());
                    }
                    Input::Unknown => {
                        println!(
                            "  enter an option number or letter, <enter> for next, t for time, q to quit"
                        );
                    }
                }
            }
        }
    }

    print_results(session);
    session.flush_submission().await;
    Ok(())
}

async fn pick_category(
    categories: &[CategorySummary],
    lines: &mut InputLines,
) -> Option<CategoryId> {
    println!("Choose a category:");
    for (i, category) in categories.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} {:<6} {} questions, {} min",
            i + 1,
            category.title,
            category.difficulty.to_string(),
            category.question_count,
            category.time_limit_minutes()
        );
    }

    loop {
        println!("Category number or id (q to quit):");
        let line = lines.recv().await?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return None;
        }
        let by_number = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| categories.get(i));
        let by_id = categories.iter().find(|c| c.id.as_str() == line);
        match by_number.or(by_id) {
            Some(category) => return Some(category.id.clone()),
            None => println!("  no category matches {line:?}"),
        }
    }
}

fn should_announce(remaining_secs: u32) -> bool {
    match remaining_secs {
        0 => false,
        1..=10 | 30 | 60 => true,
        secs => secs % 300 == 0,
    }
}

fn print_intro(attempt: &QuizAttempt) {
    let category = attempt.category();
    println!();
    println!("{} ({})", category.title(), category.difficulty());
    println!(
        "{} questions, {} on the clock. Answer with a number, <enter> moves on.",
        category.question_count(),
        attempt.remaining_display()
    );
}

fn print_question(view: &QuizView) {
    let QuizView::Active(question) = view else {
        return;
    };
    print_active(question);
}

fn print_active(view: &ActiveQuestionView) {
    println!();
    println!("Question {}  [{}]", view.counter(), view.remaining_display);
    println!("{}", view.prompt);
    for (i, option) in view.options.iter().enumerate() {
        let marker = if view.selected == Some(i) { '>' } else { ' ' };
        println!(" {marker} {}. {option}", i + 1);
    }
    let action = if view.is_last_question { "finish" } else { "next" };
    println!("(<enter> for {action})");
}

fn print_results(session: &QuizSessionService) {
    let Some(attempt) = session.attempt() else {
        return;
    };
    let QuizView::Completed(outcome) = session.view() else {
        return;
    };

    println!();
    println!("Quiz complete: {}", outcome.category_title);
    println!(
        "Score: {}% ({}/{} correct) in {}",
        outcome.score,
        outcome.correct_answers,
        outcome.total_questions,
        prep_core::time::format_countdown(outcome.elapsed_secs)
    );

    for (i, review) in attempt.review().unwrap_or_default().iter().enumerate() {
        let mark = if review.is_correct { "correct" } else { "wrong" };
        let question = review.question;
        println!();
        println!("{}. {} [{mark}]", i + 1, question.prompt());
        let chosen = review
            .chosen
            .and_then(|c| question.options().get(c))
            .map_or("(no answer)", String::as_str);
        println!("   your answer: {chosen}");
        if !review.is_correct {
            let correct = question
                .options()
                .get(question.correct_option())
                .map_or("", String::as_str);
            println!("   correct:     {correct}");
        }
        if !question.explanation().is_empty() {
            println!("   {}", question.explanation());
        }
    }
}
