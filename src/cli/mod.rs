//! CLI parser and dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::models::JobStatus;

#[derive(Parser)]
#[command(name = "iscout")]
#[command(about = "Internship posting acquisition and tracking system")]
#[command(version)]
pub struct Cli {
    /// Settings file path (defaults to ./internscout.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the settings file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Session scope for storage and deduplication
    #[arg(short, long, global = true)]
    session: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default settings file and create the database
    Init,

    /// Discover, filter, and store postings for a query
    Search {
        /// Search query, e.g. "software engineering internship"
        query: String,

        /// Maximum postings to process (overrides the settings file)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Browse and manage stored postings
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Posting counts per tracking status
    Stats,
}

#[derive(Subcommand)]
enum JobCommands {
    /// List stored postings
    List {
        /// Filter by tracking status
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Show one posting in full
    Show { id: String },

    /// Change a posting's tracking status
    Status {
        id: String,
        /// One of: new, interested, applied, interview, rejected, hidden,
        /// not_interested
        status: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Rate a posting 1-5
    Rate { id: String, rating: u8 },

    /// Attach notes to a posting
    Note { id: String, text: String },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        settings.database.path = database;
    }
    let scope = cli.session.unwrap_or_default();

    match cli.command {
        Commands::Init => commands::init::run(&settings, cli.config.as_deref()),
        Commands::Search { query, limit } => {
            commands::search::run(&settings, &scope, &query, limit).await
        }
        Commands::Jobs { command } => match command {
            JobCommands::List {
                status,
                limit,
                offset,
            } => {
                let status = status.as_deref().map(parse_status).transpose()?;
                commands::jobs::list(&settings, &scope, status, limit, offset)
            }
            JobCommands::Show { id } => commands::jobs::show(&settings, &scope, &id),
            JobCommands::Status { id, status, notes } => commands::jobs::set_status(
                &settings,
                &scope,
                &id,
                parse_status(&status)?,
                notes.as_deref(),
            ),
            JobCommands::Rate { id, rating } => commands::jobs::rate(&settings, &scope, &id, rating),
            JobCommands::Note { id, text } => commands::jobs::note(&settings, &scope, &id, &text),
        },
        Commands::Stats => commands::jobs::stats(&settings, &scope),
    }
}

fn parse_status(s: &str) -> anyhow::Result<JobStatus> {
    JobStatus::from_str(s).ok_or_else(|| anyhow::anyhow!("unknown status: {s}"))
}
