//! `taskboard` command-line entry point.
//!
//! # Responsibility
//! - Load configuration (`.env`, environment, flags) and bootstrap logging.
//! - Drive core operations against one SQLite file and print JSON results.
//! - Map caller-visible error kinds to distinct exit codes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{init_logging, open_db, AppConfig, BoardError};

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Task board with ordered lists and cards")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "TASKBOARD_DB_PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Session credential printed by `login`
    #[arg(long, env = "TASKBOARD_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print core health and version
    Health,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Start a session and print its credential
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Revoke the current session credential
    Logout,
    /// Show the signed-in account
    Me,
    /// Remove expired sessions
    PurgeSessions,
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },
}

#[derive(Subcommand)]
pub enum BoardCommands {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List your boards, oldest first
    List,
    Get {
        id: String,
    },
    /// Change name and/or description; an empty description clears it
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a board with all its lists and cards
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ListCommands {
    Create {
        #[arg(long)]
        board: String,
        #[arg(long)]
        name: String,
        /// 1-based rank; omitted appends
        #[arg(long, allow_negative_numbers = true)]
        position: Option<i64>,
    },
    /// Lists of a board in order
    List {
        #[arg(long)]
        board: String,
    },
    Get {
        id: String,
    },
    Rename {
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Reorder a list, optionally into another board
    Move {
        id: String,
        #[arg(long)]
        board: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        position: Option<i64>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CardCommands {
    Create {
        #[arg(long)]
        list: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        position: Option<i64>,
    },
    /// Cards of a list in order
    List {
        #[arg(long)]
        list: String,
    },
    Get {
        id: String,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Reorder a card, optionally into another list
    Move {
        id: String,
        #[arg(long)]
        list: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        position: Option<i64>,
    },
    Delete {
        id: String,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(board_err) = err.downcast_ref::<BoardError>() {
                let body = serde_json::json!({
                    "error": { "kind": board_err.kind(), "message": board_err.to_string() }
                });
                eprintln!("{body}");
                return ExitCode::from(exit_code(board_err));
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env().context("failed to read configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    let level = cli.log_level.as_deref().unwrap_or(config.log_level);
    init_logging(level, config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let output = cmd::dispatch(&conn, &config, cli.token.as_deref(), cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn exit_code(err: &BoardError) -> u8 {
    match err {
        BoardError::ValidationFailed(_) => 2,
        BoardError::Unauthenticated => 3,
        BoardError::Forbidden(_) => 4,
        BoardError::NotFound(_) => 5,
        BoardError::Conflict => 6,
        BoardError::Internal(_) => 7,
    }
}
