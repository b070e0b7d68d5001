//! Command-line interface, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::*;

/// Kanban - self-hosted task board backend
#[derive(Parser)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the retention scheduler (default)
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Delete activity entries older than N days, then exit
    PruneActivity {
        /// Age threshold in days (default: activity.retention_days)
        #[arg(long)]
        days: Option<u32>,
    },
}
