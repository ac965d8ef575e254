use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use kidsquiz::clients::{ClientType, FlexibleClient};
use kidsquiz::config::AppConfig;
use kidsquiz::generator::LlmQuestionGenerator;
use kidsquiz::identity::{EnvIdentity, IdentityProvider, StaticIdentity};
use kidsquiz::interceptors::FileInterceptor;
use kidsquiz::model::{Difficulty, QuizConfig, GRADES, SUBJECTS};
use kidsquiz::store::JsonFileStore;
use kidsquiz::{QuizApp, QuizAttempt, QuizError};

#[derive(Clone, Debug, ValueEnum)]
enum Provider {
    Openai,
    Claude,
    Deepseek,
    Mock,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Openai => write!(f, "openai"),
            Provider::Claude => write!(f, "claude"),
            Provider::Deepseek => write!(f, "deepseek"),
            Provider::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Difficulty::Easy,
            Level::Medium => Difficulty::Medium,
            Level::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Multiple-choice quizzes for kids", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    KIDSQUIZ_PROVIDER        openai|claude|deepseek|mock [default: auto-detect]
    KIDSQUIZ_MODEL           Override the provider's model id
    KIDSQUIZ_DATA_DIR        Where the question bank and history live [default: .kidsquiz]
    KIDSQUIZ_TRANSCRIPT_DIR  Save every generator prompt/response here
    KIDSQUIZ_USER_ID         Who is playing
    OPENAI_API_KEY / ANTHROPIC_API_KEY / DEEPSEEK_API_KEY

EXAMPLES:
    kidsquiz --user sam play --subject Math --grade 3rd -n 5
    kidsquiz --user sam history --limit 20
    kidsquiz bank")]
struct Args {
    /// Completion provider [default: auto-detect from API keys]
    #[arg(short, long, value_enum, global = true)]
    provider: Option<Provider>,

    /// Data directory (overrides KIDSQUIZ_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Player id (overrides KIDSQUIZ_USER_ID)
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Take a quiz
    Play {
        #[arg(short, long, default_value = "Math")]
        subject: String,

        #[arg(short, long, default_value = "3rd")]
        grade: String,

        #[arg(short, long, value_enum, default_value_t = Level::Medium)]
        difficulty: Level,

        /// Number of questions (1-10)
        #[arg(short = 'n', long, default_value_t = 5)]
        questions: usize,
    },
    /// Show past quiz results, newest first
    History {
        /// How many quizzes to list; totals cover all of them
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Count banked questions per topic
    Bank,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kidsquiz=info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(provider) = &args.provider {
        config = config.with_provider(ClientType::from_str(&provider.to_string())?);
    }
    if let Some(dir) = args.data_dir.clone() {
        config = config.with_data_dir(dir);
    }

    let store = Arc::new(
        JsonFileStore::open(&config.data_dir)
            .await
            .with_context(|| format!("opening data directory {}", config.data_dir.display()))?,
    );

    if let Command::Bank = args.command {
        let summary = store.snapshot().await.bank_summary();
        if summary.is_empty() {
            println!("The question bank is empty.");
        }
        for ((subject, grade, difficulty), count) in summary {
            println!("{:<10} {:<4} {:<7} {:>4}", subject, grade, difficulty, count);
        }
        return Ok(());
    }

    let identity: Arc<dyn IdentityProvider> = match &args.user {
        Some(user) => Arc::new(StaticIdentity::signed_in(user.clone(), user.clone())),
        None => Arc::new(EnvIdentity),
    };

    let mut generator = LlmQuestionGenerator::new(FlexibleClient::from_config(&config)?);
    if let Some(dir) = &config.transcript_dir {
        generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));
    }
    let app = QuizApp::new(store.clone(), store, generator, identity);

    match args.command {
        Command::Play { subject, grade, difficulty, questions } => {
            let quiz = QuizConfig::new(subject, grade, difficulty.into(), questions)?;
            play(&app, quiz).await
        }
        Command::History { limit } => history(&app, limit).await,
        Command::Bank => Ok(()),
    }
}

async fn play(app: &QuizApp<LlmQuestionGenerator<FlexibleClient>>, config: QuizConfig) -> Result<()> {
    if !SUBJECTS.contains(&config.subject()) || !GRADES.contains(&config.grade()) {
        println!("Note: {} is not one of the usual topics.", config.topic());
    }
    println!("Getting your {} questions ready...", config.number_of_questions());

    let mut attempt = match app.start_quiz(config).await {
        Ok(attempt) => attempt,
        Err(QuizError::NotAuthenticated) => bail!("Nobody is signed in. Pass --user or set KIDSQUIZ_USER_ID."),
        Err(e) if e.is_retryable() => bail!("Could not get questions ({e}). Please try again."),
        Err(e) => return Err(e.into()),
    };

    while let Some(question) = attempt.session().current_question().cloned() {
        let index = attempt.session().current_index().unwrap_or_default();
        println!();
        println!("Question {} of {}", index + 1, attempt.session().total());
        println!("{}", question.text());
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}) {}", (b'A' + i as u8) as char, option);
        }

        let Some(choice) = read_choice(question.options().len())? else {
            println!("Bye!");
            attempt.settle().await;
            return Ok(());
        };
        let outcome = attempt.submit_answer(&question.options()[choice])?;
        if outcome.is_correct {
            println!("Correct!");
        } else {
            println!("Not quite. The answer was: {}", outcome.correct_answer);
        }
        attempt.advance()?;
    }

    finish(&mut attempt).await;
    Ok(())
}

async fn finish(attempt: &mut QuizAttempt) {
    attempt.settle().await;
    let score = attempt.session().score();
    let total = attempt.session().total();
    println!();
    match attempt.record_completion().await {
        Ok(record) => println!("You scored {}/{} ({}%)", score, total, record.percentage()),
        Err(e) => {
            warn!(error = %e, "Quiz result not saved");
            println!("You scored {}/{}. Your result could not be saved this time.", score, total);
        }
    }
}

async fn history(app: &QuizApp<LlmQuestionGenerator<FlexibleClient>>, limit: usize) -> Result<()> {
    let dashboard = app.dashboard().await?;
    if dashboard.is_empty() {
        println!("No quizzes yet for {}.", dashboard.user);
        return Ok(());
    }

    for record in dashboard.recent(limit) {
        println!(
            "{}  {:<10} {:<4} {:>2}/{:<2} {:>3}%",
            record.date.format("%Y-%m-%d %H:%M"),
            record.subject,
            record.grade,
            record.score,
            record.total_questions,
            record.percentage()
        );
    }
    let summary = &dashboard.summary;
    println!();
    println!(
        "{} quizzes, {}/{} correct, average {}%",
        summary.quizzes_taken, summary.correct_answers, summary.questions_answered, summary.average_percentage
    );
    Ok(())
}

/// Wait for A-D (or 1-4). `None` when the player quits with q, Esc, Ctrl-C or Ctrl-D.
fn read_choice(options: usize) -> Result<Option<usize>> {
    print!("Your answer: ");
    io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) => match key_action(&key, options) {
                KeyAction::Choose(choice) => break Ok(Some(choice)),
                KeyAction::Quit => break Ok(None),
                KeyAction::Ignore => {}
            },
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;

    let choice = result?;
    if let Some(i) = choice {
        println!("{}", (b'A' + i as u8) as char);
    } else {
        println!();
    }
    Ok(choice)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Choose(usize),
    Quit,
    Ignore,
}

/// Raw mode swallows SIGINT, so Ctrl-C arrives here as a key and must quit.
fn key_action(key: &KeyEvent, options: usize) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C' | 'd' | 'D') => KeyAction::Quit,
            _ => KeyAction::Ignore,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char(c) => choice_from_key(c)
            .filter(|&i| i < options)
            .map_or(KeyAction::Ignore, KeyAction::Choose),
        _ => KeyAction::Ignore,
    }
}

fn choice_from_key(c: char) -> Option<usize> {
    match c.to_ascii_uppercase() {
        'A'..='D' => Some(c.to_ascii_uppercase() as usize - 'A' as usize),
        '1'..='4' => Some(c as usize - '1' as usize),
        _ => None,
    }
}
