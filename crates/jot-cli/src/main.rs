//! Jot CLI - Quick-entry bookkeeping text parser
//!
//! Usage:
//!   jot parse "lunch 180 cash, today"   Parse one entry
//!   jot prefs list                      Show learned preferences
//!   jot remote test                     Check the remote backend

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Parse {
            text,
            today,
            local_only,
            no_learn,
            json,
        } => {
            commands::cmd_parse(
                &cli.ledger,
                cli.prefs.as_deref(),
                &text,
                today.as_deref(),
                local_only,
                no_learn,
                json,
            )
            .await
        }
        Commands::Prefs { action } => match action {
            None | Some(PrefsAction::List) => commands::cmd_prefs_list(cli.prefs.as_deref()),
        },
        Commands::Remote { action } => match action {
            RemoteAction::Test { text } => commands::cmd_remote_test(&cli.ledger, &text).await,
        },
    }
}
