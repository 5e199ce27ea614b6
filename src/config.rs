//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, FromArgMatches, Parser, Subcommand};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".choir-songbook";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "songbook.sqlite";
/// Display preferences written by the terminal UI.
const PREFERENCES_FILE_NAME: &str = "preferences.toml";
/// The terminal UI owns stdout, so its logs go here instead.
const LOG_FILE_NAME: &str = "choir-songbook.log";

#[derive(Debug, Parser)]
#[command(name = "choir-songbook", version, about = "Church choir songbook and weekly song planner")]
pub struct Cli {
    /// Path to the SQLite database (defaults to ~/.choir-songbook/songbook.sqlite)
    #[arg(long, global = true, env = "CHOIR_SONGBOOK_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Browse the songbook in the terminal (default)
    Tui(TuiArgs),
    /// Serve the JSON API
    Serve(ServeArgs),
    /// Load sample songs and this week's selection into an empty songbook
    Seed,
}

#[derive(Debug, Clone, Args)]
pub struct TuiArgs {
    /// Enable song editing and weekly selection
    #[arg(long)]
    pub admin: bool,

    /// Name recorded on weekly selections created from this session
    #[arg(long, env = "CHOIR_SONGBOOK_ADMIN_NAME", default_value = "admin")]
    pub admin_name: String,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "CHOIR_SONGBOOK_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Bearer token required for write requests. Without it writes are open.
    #[arg(long, env = "CHOIR_SONGBOOK_ADMIN_TOKEN")]
    pub admin_token: Option<String>,

    /// Name recorded on weekly selections created through the API
    #[arg(long, env = "CHOIR_SONGBOOK_ADMIN_NAME", default_value = "admin")]
    pub admin_name: String,
}

impl Cli {
    /// The chosen subcommand. Without one this is `tui` with its defaults,
    /// resolved by clap so environment overrides still apply.
    pub fn command(&self) -> Result<Command> {
        if let Some(command) = &self.command {
            return Ok(command.clone());
        }
        let matches =
            TuiArgs::augment_args(clap::Command::new("tui")).try_get_matches_from(["tui"])?;
        Ok(Command::Tui(TuiArgs::from_arg_matches(&matches)?))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }
}

/// Resolve the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn preferences_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(PREFERENCES_FILE_NAME))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE_NAME))
}
