use prep_core::model::InterviewSession;
use prep_core::time::format_countdown;
use services::InterviewService;
use services::ai::{CareerCoach, InterviewChat};
use tokio::time::Instant;

use crate::input::InputLines;

fn is_exit(line: &str) -> bool {
    matches!(
        line.to_ascii_lowercase().as_str(),
        "q" | "quit" | "end" | "exit"
    )
}

/// Answers `question` once, or keeps answering typed questions until the user quits.
pub async fn run_coach(
    coach: &CareerCoach,
    question: Option<String>,
    lines: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(question) = question {
        println!("{}", coach.ask(&question).await?);
        return Ok(());
    }

    loop {
        println!();
        println!("Ask the career coach (q to quit):");
        let Some(line) = lines.recv().await else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            return Ok(());
        }
        match coach.ask(line).await {
            Ok(answer) => println!("{answer}"),
            Err(err) => println!("  {err}"),
        }
    }
}

/// Runs a started interview until the user ends it, then stores the transcript.
pub async fn run_interview(
    interviews: &InterviewService,
    session: InterviewSession,
    mut chat: InterviewChat,
    lines: &mut InputLines,
) -> Result<InterviewSession, Box<dyn std::error::Error>> {
    let setup = &session.setup;
    println!();
    println!(
        "Interview #{}: {} ({}, {}), about {} minutes.",
        session.id,
        setup.title(),
        setup.kind(),
        setup.difficulty(),
        setup.planned_minutes()
    );
    println!("Type your answers; 'end' finishes the interview.");
    println!();
    println!("Interviewer: {}", chat.greeting());

    let started = Instant::now();
    loop {
        let Some(line) = lines.recv().await else {
            log::info!("stdin closed; ending interview {}", session.id);
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }
        match chat.reply(line).await {
            Ok(reply) => {
                println!();
                println!("Interviewer: {reply}");
            }
            Err(err) => println!("  {err}"),
        }
    }

    let elapsed = u32::try_from(started.elapsed().as_secs()).unwrap_or(u32::MAX);
    let ended = interviews
        .end(session.id, elapsed, chat.into_transcript())
        .await?;
    println!();
    println!(
        "Interview complete after {} with {} messages.",
        format_countdown(elapsed),
        ended.transcript.len()
    );
    Ok(ended)
}
