//! CLI interface for kit-hooks
//!
//! Provides subcommands for:
//! - `dispatch`: Feed NDJSON events through the hooks
//! - `targets`: Manage price targets
//! - `status`: Show registered hooks
//! - `config`: Show configuration

mod dispatch;
mod targets;

pub use dispatch::DispatchArgs;
pub use targets::{TargetsArgs, TargetsCommand};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kit-hooks")]
#[command(about = "Event hooks for the K.I.T. trading assistant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "kit-hooks.toml")]
    pub config: String,

    /// Override the data directory from the configuration
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch NDJSON events to the hooks
    Dispatch(DispatchArgs),
    /// Manage price targets
    Targets(TargetsArgs),
    /// Show registered hooks
    Status,
    /// Show configuration
    Config,
}
