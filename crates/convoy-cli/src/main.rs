use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use convoy_application::SessionCoordinator;
use convoy_core::debug::DebugLevel;
use convoy_core::session::SessionId;
use convoy_core::state::MergeStrategy;
use convoy_infrastructure::ConfigService;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "CONVOY - file-backed session coordination for worker processes", long_about = None)]
struct Cli {
    /// Path to a config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured sessions root
    #[arg(long, global = true)]
    sessions_root: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new session directory with an initial state document
    Create {
        /// Task the session is for; slugified into the session ID
        task: String,
        /// Use this session ID instead of generating one
        #[arg(long)]
        session_id: Option<SessionId>,
        /// Description stored in the state document (defaults to the task)
        #[arg(long)]
        description: Option<String>,
    },
    /// Append a lifecycle event to EVENTS.jsonl
    Event {
        session_id: SessionId,
        event_type: String,
        #[arg(long)]
        agent: String,
        #[arg(long, default_value = "")]
        details: String,
        #[arg(long)]
        status: Option<String>,
    },
    /// Append an entry to DEBUG.jsonl
    Debug {
        session_id: SessionId,
        /// INFO, SUCCESS, WARNING, ERROR or COMPLIANCE
        level: DebugLevel,
        message: String,
        #[arg(long)]
        agent: String,
        /// JSON context attached to the entry
        #[arg(long)]
        context: Option<String>,
    },
    /// Merge a JSON patch into STATE.json
    Update {
        session_id: SessionId,
        patch: String,
        #[arg(long, default_value = "deep")]
        strategy: MergeStrategy,
    },
    /// Print the state document
    Show {
        session_id: SessionId,
        /// Rebuild the document from the event log if it is corrupt or missing
        #[arg(long)]
        recover: bool,
    },
    /// Check every worker entry of the state document
    Validate { session_id: SessionId },
    /// Verify that a worker completed the required lifecycle
    Verify {
        session_id: SessionId,
        worker: String,
    },
    /// List active workers with a stale heartbeat
    Health { session_id: SessionId },
    /// Rebuild the state document from EVENTS.jsonl
    Recover {
        session_id: SessionId,
        /// Replace STATE.json with the rebuilt document
        #[arg(long)]
        write: bool,
    },
    /// Poll worker health until interrupted
    Watch {
        session_id: SessionId,
        /// Seconds between checks
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn coordinator(cli: &Cli) -> Result<SessionCoordinator> {
    let mut config = ConfigService::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(root) = &cli.sessions_root {
        config.sessions_root = root.clone();
    }
    Ok(SessionCoordinator::from_config(config))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let coordinator = coordinator(&cli)?;

    let passed = match cli.command {
        Commands::Create {
            task,
            session_id,
            description,
        } => commands::session::create(&coordinator, &task, session_id, description)?,
        Commands::Event {
            session_id,
            event_type,
            agent,
            details,
            status,
        } => commands::session::event(
            &coordinator,
            &session_id,
            &event_type,
            &agent,
            &details,
            status.as_deref(),
        )?,
        Commands::Debug {
            session_id,
            level,
            message,
            agent,
            context,
        } => commands::session::debug(
            &coordinator,
            &session_id,
            level,
            &agent,
            &message,
            context.as_deref(),
        )?,
        Commands::Update {
            session_id,
            patch,
            strategy,
        } => commands::state::update(&coordinator, &session_id, &patch, strategy)?,
        Commands::Show {
            session_id,
            recover,
        } => commands::state::show(&coordinator, &session_id, recover)?,
        Commands::Validate { session_id } => commands::state::validate(&coordinator, &session_id)?,
        Commands::Recover { session_id, write } => {
            commands::state::recover(&coordinator, &session_id, write)?
        }
        Commands::Verify { session_id, worker } => {
            commands::monitor::verify(&coordinator, &session_id, &worker)?
        }
        Commands::Health { session_id } => commands::monitor::health(&coordinator, &session_id)?,
        Commands::Watch {
            session_id,
            interval,
        } => commands::monitor::watch(&coordinator, &session_id, interval).await?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
