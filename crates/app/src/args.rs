use std::fmt;
use std::path::PathBuf;

use prep_core::model::{CategoryId, Difficulty, InterviewSetup, QuestionFilter, UserId};
use storage::sqlite::DEFAULT_DB_URL;

const DEFAULT_INTERVIEW_TYPE: &str = "technical";
const DEFAULT_USER: &str = "local-user";
const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    UnexpectedArg(String),
    InvalidUserId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidCategory { raw: String },
    InvalidDifficulty { raw: String },
    InvalidLimit { raw: String },
    InvalidMinutes { raw: String },
    InvalidInterview(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::UnexpectedArg(arg) => write!(f, "unexpected argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value (easy|medium|hard): {raw}")
            }
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::InvalidMinutes { raw } => write!(f, "invalid --minutes value: {raw}"),
            ArgsError::InvalidInterview(reason) => write!(f, "invalid interview: {reason}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quiz { category: Option<CategoryId> },
    Categories,
    Browse(QuestionFilter),
    History { limit: u32 },
    Extract { path: PathBuf },
    Questions { resume: PathBuf, job: PathBuf },
    Resume { resume: PathBuf, job: Option<PathBuf> },
    Coach { question: Option<String> },
    Interview(InterviewSetup),
    Interviews,
    Help,
}

impl Command {
    /// Whether the command needs the results database.
    pub fn uses_storage(&self) -> bool {
        matches!(
            self,
            Self::Quiz { .. } | Self::History { .. } | Self::Interview(_) | Self::Interviews
        )
    }

    /// Whether the command reads answers from stdin.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Self::Quiz { .. } | Self::Coach { question: None } | Self::Interview(_)
        )
    }
}

/// Settings read from the environment before flags are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvDefaults {
    pub db_url: Option<String>,
    pub user_id: Option<String>,
    pub submit_url: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            db_url: non_empty("PREP_DB_URL"),
            user_id: non_empty("PREP_USER_ID"),
            submit_url: non_empty("PREP_SUBMIT_URL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub user_id: UserId,
    pub submit_url: Option<String>,
    pub command: Command,
}

impl Args {
    pub fn parse(
        env: EnvDefaults,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env
            .db_url
            .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let mut user_id = env
            .user_id
            .and_then(|raw| raw.parse::<UserId>().ok())
            .unwrap_or_else(|| UserId::new(DEFAULT_USER));
        let mut submit_url = env.submit_url;

        let mut command: Option<String> = None;
        let mut positional: Vec<String> = Vec::new();
        let mut filter = QuestionFilter::default();
        let mut limit = DEFAULT_HISTORY_LIMIT;
        let mut resume: Option<PathBuf> = None;
        let mut job: Option<PathBuf> = None;
        let mut title: Option<String> = None;
        let mut kind: Option<String> = None;
        let mut company: Option<String> = None;
        let mut minutes: Option<u32> = None;
        let mut help = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                }
                "--submit-url" => {
                    submit_url = Some(require_value(&mut args, "--submit-url")?);
                }
                "--category" => {
                    let value = require_value(&mut args, "--category")?;
                    filter.category = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?,
                    );
                }
                "--difficulty" => {
                    let value = require_value(&mut args, "--difficulty")?;
                    filter.difficulty = Some(
                        value
                            .parse::<Difficulty>()
                            .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?,
                    );
                }
                "--search" => {
                    filter.search = Some(require_value(&mut args, "--search")?);
                }
                "--limit" => {
                    let value = require_value(&mut args, "--limit")?;
                    limit = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--resume" => resume = Some(require_value(&mut args, "--resume")?.into()),
                "--job" => job = Some(require_value(&mut args, "--job")?.into()),
                "--title" => title = Some(require_value(&mut args, "--title")?),
                "--type" => kind = Some(require_value(&mut args, "--type")?),
                "--company" => company = Some(require_value(&mut args, "--company")?),
                "--minutes" => {
                    let value = require_value(&mut args, "--minutes")?;
                    minutes = Some(
                        value
                            .parse::<u32>()
                            .map_err(|_| ArgsError::InvalidMinutes { raw: value.clone() })?,
                    );
                }
                "--help" | "-h" => help = true,
                flag if flag.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ if command.is_none() => command = Some(arg),
                _ => positional.push(arg),
            }
        }

        if help {
            return Ok(Self {
                db_url,
                user_id,
                submit_url,
                command: Command::Help,
            });
        }

        let mut positional = positional.into_iter();
        let command = match command.as_deref().unwrap_or("quiz") {
            "quiz" => Command::Quiz {
                category: filter.category,
            },
            "categories" => Command::Categories,
            "browse" => Command::Browse(filter),
            "history" => Command::History { limit },
            "extract" => Command::Extract {
                path: positional
                    .next()
                    .map(PathBuf::from)
                    .ok_or(ArgsError::MissingArgument { what: "<path>" })?,
            },
            "questions" => Command::Questions {
                resume: resume.ok_or(ArgsError::MissingArgument { what: "--resume" })?,
                job: job.ok_or(ArgsError::MissingArgument { what: "--job" })?,
            },
            "resume" => Command::Resume {
                resume: resume.ok_or(ArgsError::MissingArgument { what: "--resume" })?,
                job,
            },
            "coach" => {
                let words: Vec<String> = positional.by_ref().collect();
                Command::Coach {
                    question: (!words.is_empty()).then(|| words.join(" ")),
                }
            }
            "interview" => {
                let title = title.ok_or(ArgsError::MissingArgument { what: "--title" })?;
                let kind = kind.unwrap_or_else(|| DEFAULT_INTERVIEW_TYPE.to_string());
                let mut setup = InterviewSetup::new(title, kind)
                    .map_err(|e| ArgsError::InvalidInterview(e.to_string()))?
                    .with_company(company)
                    .with_difficulty(filter.difficulty.unwrap_or(Difficulty::Medium));
                if let Some(minutes) = minutes {
                    setup = setup
                        .with_planned_minutes(minutes)
                        .map_err(|e| ArgsError::InvalidInterview(e.to_string()))?;
                }
                Command::Interview(setup)
            }
            "interviews" => Command::Interviews,
            "help" => Command::Help,
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnexpectedArg(extra));
        }

        Ok(Self {
            db_url,
            user_id,
            submit_url,
            command,
        })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [global options] <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  quiz [--category <id>]                 Take a timed quiz (default)");
    eprintln!("  categories                             List quiz categories");
    eprintln!("  browse [--category <id>] [--difficulty <level>] [--search <text>]");
    eprintln!("                                         Browse the question bank");
    eprintln!("  history [--limit <n>]                  Recent results and stats");
    eprintln!("  extract <path>                         Print text from a PDF, DOCX or TXT file");
    eprintln!("  questions --resume <path> --job <path> Generate interview questions");
    eprintln!("  resume --resume <path> [--job <path>]  Analyze a resume");
    eprintln!("  coach [question...]                    Ask the career coach");
    eprintln!("  interview --title <role> [--type <t>] [--company <name>]");
    eprintln!("            [--difficulty <level>] [--minutes <n>]");
    eprintln!("                                         Run a mock interview");
    eprintln!("  interviews                             List past mock interviews");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>        Results database (default: {DEFAULT_DB_URL})");
    eprintln!("  --user <id>              User id for results (default: {DEFAULT_USER})");
    eprintln!("  --submit-url <base_url>  POST results to <base_url>/api/quiz/complete");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_DB_URL, PREP_USER_ID, PREP_SUBMIT_URL");
    eprintln!("  PREP_AI_API_KEY, PREP_AI_BASE_URL, PREP_AI_MODEL");
    eprintln!("  RUST_LOG (default: info)");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> EnvDefaults {
        EnvDefaults {
            db_url: None,
            user_id: None,
            submit_url: None,
        }
    }

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(no_env(), args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn defaults_to_quiz() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Quiz { category: None });
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.user_id, UserId::new(DEFAULT_USER));
        assert_eq!(args.submit_url, None);
    }

    #[test]
    fn global_flags_mix_with_command_flags() {
        let args = parse(&[
            "--user",
            "alice",
            "browse",
            "--difficulty",
            "HARD",
            "--search",
            "cache",
            "--submit-url",
            "http://localhost:3000",
        ])
        .unwrap();
        assert_eq!(args.user_id, UserId::new("alice"));
        assert_eq!(args.submit_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(
            args.command,
            Command::Browse(QuestionFilter {
                category: None,
                difficulty: Some(Difficulty::Hard),
                search: Some("cache".into()),
            })
        );
    }

    #[test]
    fn env_defaults_are_overridden_by_flags() {
        let env = EnvDefaults {
            db_url: Some("sqlite:///tmp/prep.sqlite3".into()),
            user_id: Some("env-user".into()),
            submit_url: Some("http://env".into()),
        };
        let args = Args::parse(env, ["--user".to_string(), "flag-user".to_string()]).unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/prep.sqlite3");
        assert_eq!(args.user_id, UserId::new("flag-user"));
        assert_eq!(args.submit_url.as_deref(), Some("http://env"));
    }

    #[test]
    fn document_commands_require_paths() {
        assert_eq!(
            parse(&["extract"]).unwrap_err(),
            ArgsError::MissingArgument { what: "<path>" }
        );
        assert_eq!(
            parse(&["questions", "--resume", "cv.pdf"]).unwrap_err(),
            ArgsError::MissingArgument { what: "--job" }
        );
        assert_eq!(
            parse(&["resume", "--resume", "cv.pdf"]).unwrap().command,
            Command::Resume {
                resume: "cv.pdf".into(),
                job: None
            }
        );
    }

    #[test]
    fn default_database_matches_seed_binary() {
        assert_eq!(parse(&["history"]).unwrap().db_url, "sqlite://dev.sqlite3");
    }

    #[test]
    fn coach_joins_question_words() {
        assert_eq!(
            parse(&["coach", "how", "do", "I", "negotiate?"]).unwrap().command,
            Command::Coach {
                question: Some("how do I negotiate?".into())
            }
        );
        let interactive = parse(&["coach"]).unwrap().command;
        assert_eq!(interactive, Command::Coach { question: None });
        assert!(interactive.is_interactive());
    }

    #[test]
    fn interview_builds_setup() {
        let args = parse(&[
            "interview",
            "--title",
            "Backend Engineer",
            "--company",
            "Acme",
            "--difficulty",
            "hard",
            "--minutes",
            "45",
        ])
        .unwrap();
        let Command::Interview(setup) = &args.command else {
            panic!("expected interview, got {:?}", args.command);
        };
        assert_eq!(setup.kind(), "technical");
        assert_eq!(setup.company(), Some("Acme"));
        assert_eq!(setup.difficulty(), Difficulty::Hard);
        assert_eq!(setup.planned_minutes(), 45);
        assert!(args.command.uses_storage());

        assert_eq!(
            parse(&["interview"]).unwrap_err(),
            ArgsError::MissingArgument { what: "--title" }
        );
        assert!(matches!(
            parse(&["interview", "--title", "SRE", "--minutes", "0"]),
            Err(ArgsError::InvalidInterview(_))
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse(&["dance"]).unwrap_err(),
            ArgsError::UnknownCommand("dance".into())
        );
        assert_eq!(
            parse(&["--verbose", "1"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert!(matches!(
            parse(&["browse", "--difficulty", "extreme"]),
            Err(ArgsError::InvalidDifficulty { .. })
        ));
        assert!(matches!(
            parse(&["history", "--limit", "0"]),
            Err(ArgsError::InvalidLimit { .. })
        ));
        assert_eq!(
            parse(&["--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/prep.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/prep.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }
}
