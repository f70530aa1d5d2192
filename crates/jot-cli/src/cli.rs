//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Jot - Turn free-form bookkeeping text into structured entries
#[derive(Parser)]
#[command(name = "jot")]
#[command(about = "Quick-entry bookkeeping text parser", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger file with accounts and categories (JSON)
    #[arg(long, default_value = "ledger.json", global = true)]
    pub ledger: PathBuf,

    /// Preference store path (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub prefs: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one free-form entry into a structured record
    Parse {
        /// The entry text, e.g. "lunch 180 cash, today"
        text: String,

        /// Local date to resolve relative dates against (YYYY-MM-DD,
        /// defaults to today)
        #[arg(long)]
        today: Option<String>,

        /// Skip the remote augmentation call even if one is configured
        #[arg(long)]
        local_only: bool,

        /// Don't write the confirmed parse into the preference store
        #[arg(long)]
        no_learn: bool,

        /// Print the result as JSON instead of the readable summary
        #[arg(long)]
        json: bool,
    },

    /// Inspect the learned preference store
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },

    /// Remote language-understanding backend utilities
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// List stored preference records
    List,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    /// Check connectivity and run a test parse against the remote backend
    Test {
        /// Sample text to parse remotely
        #[arg(default_value = "lunch 180 cash")]
        text: String,
    },
}
