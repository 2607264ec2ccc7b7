mod args;
mod chat_loop;
mod input;
mod quiz_loop;

use std::path::Path;

use args::{Args, ArgsError, Command, EnvDefaults, print_usage};
use prep_core::model::QuestionFilter;
use prep_core::time::format_countdown;
use services::ai::InterviewContext;
use services::{AppServices, Clock, extract_text};
use storage::repository::Storage;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(EnvDefaults::from_env(), std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let clock = Clock::default_clock();
    let submit_url = args.submit_url.as_deref();
    let services = if args.command.uses_storage() {
        // Open + migrate SQLite here so the library crates never touch the filesystem.
        prepare_sqlite_file(&args.db_url)?;
        AppServices::new_sqlite(&args.db_url, clock, args.user_id.clone(), submit_url).await?
    } else {
        AppServices::from_storage(
            Storage::in_memory(),
            clock,
            args.user_id.clone(),
            submit_url,
        )?
    };

    let mut lines = if args.command.is_interactive() {
        input::stdin_lines()?
    } else {
        tokio::sync::mpsc::unbounded_channel().1
    };

    match args.command {
        Command::Quiz { category } => {
            let mut session = services.quiz_session();
            quiz_loop::run(&mut session, category, &mut lines).await
        }
        Command::Categories => {
            list_categories(&services);
            Ok(())
        }
        Command::Browse(filter) => {
            browse(&services, &filter);
            Ok(())
        }
        Command::History { limit } => history(&services, limit).await,
        Command::Extract { path } => {
            println!("{}", read_document(&path)?);
            Ok(())
        }
        Command::Questions { resume, job } => {
            require_ai(&services)?;
            let resume = read_document(&resume)?;
            let job = read_document(&job)?;
            let questions = services.prep_questions().generate(&resume, &job).await?;
            if questions.is_empty() {
                println!("The assistant did not return any questions.");
            }
            for (i, question) in questions.iter().enumerate() {
                println!("{}. [{}] {}", i + 1, question.category, question.question);
                println!("   {}", question.suggested_answer);
                println!();
            }
            Ok(())
        }
        Command::Resume { resume, job } => {
            require_ai(&services)?;
            let resume = read_document(&resume)?;
            let job = job.as_deref().map(read_document).transpose()?;
            let analysis = services
                .resume_analyzer()
                .analyze(&resume, job.as_deref())
                .await?;

            println!("Overall score: {}/100", analysis.overall_score);
            for section in &analysis.sections {
                println!();
                println!("{} ({}/100)", section.name, section.score);
                println!("  {}", section.feedback);
                for suggestion in &section.suggestions {
                    println!("  - {suggestion}");
                }
            }
            println!();
            println!("Strengths: {}", analysis.strengths.join(", "));
            println!("Improvements: {}", analysis.improvements.join(", "));
            println!("Keywords present: {}", analysis.keywords.present.join(", "));
            println!("Keywords missing: {}", analysis.keywords.missing.join(", "));
            Ok(())
        }
        Command::Coach { question } => {
            require_ai(&services)?;
            chat_loop::run_coach(&services.career_coach(), question, &mut lines).await
        }
        Command::Interview(setup) => {
            require_ai(&services)?;
            let interviews = services.interviews();
            let session = interviews.schedule(services.user_id(), &setup).await?;
            let session = interviews.begin(session.id).await?;
            let chat = services.interview_chat(InterviewContext::from_setup(&session.setup));
            chat_loop::run_interview(&interviews, session, chat, &mut lines).await?;
            Ok(())
        }
        Command::Interviews => list_interviews(&services).await,
        Command::Help => Ok(()),
    }
}

fn list_categories(services: &AppServices) {
    let catalog = services.catalog();
    for category in catalog.categories() {
        println!(
            "{:<20} {:<40} {:<6} {:>2} questions  {:>3} min",
            category.id().as_str(),
            category.title(),
            category.difficulty().to_string(),
            category.question_count(),
            category.time_limit_secs() / 60
        );
    }
}

fn browse(services: &AppServices, filter: &QuestionFilter) {
    let items = services.question_bank().browse(filter);
    if items.is_empty() {
        println!("No questions match.");
        return;
    }
    for item in &items {
        println!("[{} | {}] {}", item.category_title, item.difficulty, item.prompt);
        for (i, option) in item.options.iter().enumerate() {
            let marker = if i == item.correct_option { '*' } else { ' ' };
            println!("  {marker} {}. {option}", i + 1);
        }
        if !item.explanation.is_empty() {
            println!("    {}", item.explanation);
        }
        println!();
    }
    println!("{} questions", items.len());
}

async fn history(services: &AppServices, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let history = services.history();
    let user = services.user_id();
    let rows = history.recent(user, limit).await?;
    if rows.is_empty() {
        println!("No quizzes completed yet for {user}.");
        return Ok(());
    }

    println!("Recent quizzes for {user}:");
    for row in &rows {
        let result = &row.result;
        println!(
            "  {}  {:<40} {:>3}%  {}/{}  {}",
            result.completed_at().format("%Y-%m-%d %H:%M"),
            result.category_title(),
            result.score(),
            result.correct_answers(),
            result.total_questions(),
            format_countdown(result.elapsed_secs())
        );
    }

    let stats = history.stats(user).await?;
    println!();
    println!(
        "{} quizzes, average {}%, best {}%, {} minutes practised",
        stats.total_attempts,
        stats.average_score,
        stats.best_score,
        stats.total_time_secs / 60
    );
    for entry in &stats.per_category {
        println!(
            "  {:<40} {:>2} attempts  best {:>3}%  latest {:>3}%",
            entry.title, entry.attempts, entry.best_score, entry.latest_score
        );
    }
    Ok(())
}

async fn list_interviews(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let user = services.user_id();
    let sessions = services.interviews().list(user).await?;
    if sessions.is_empty() {
        println!("No mock interviews yet for {user}.");
        return Ok(());
    }

    for session in &sessions {
        let setup = &session.setup;
        let length = session
            .elapsed_secs
            .map_or_else(|| format!("{} min planned", setup.planned_minutes()), format_countdown);
        println!(
            "  #{:<4} {}  {:<30} {:<12} {:<6} {:<11} {}  {} messages",
            session.id,
            session.created_at.format("%Y-%m-%d %H:%M"),
            setup.title(),
            setup.kind(),
            setup.difficulty().to_string(),
            session.status.as_str(),
            length,
            session.transcript.len()
        );
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(extract_text(&bytes, &name, None)?)
}

fn require_ai(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    if services.ai_enabled() {
        Ok(())
    } else {
        Err("set PREP_AI_API_KEY to use the AI assistant".into())
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{err}");
        std::process::exit(2);
    }
}
