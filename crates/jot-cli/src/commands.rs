//! Command implementations for the jot CLI

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use jot_core::{
    Account, Category, ConfidenceGate, FieldOverrides, ParserConfig, PreferenceStore,
    RemoteBackend, RemoteClient, RemoteRequest,
};

/// Ledger file shape: the external collaborator's account/category lists
#[derive(Debug, Deserialize)]
struct Ledger {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    categories: Vec<Category>,
}

fn load_ledger(path: &Path) -> Result<Ledger> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ledger file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid ledger file {}", path.display()))
}

fn prefs_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => PreferenceStore::default_path()
            .context("Could not determine a data directory for the preference store"),
    }
}

pub async fn cmd_parse(
    ledger_path: &Path,
    prefs_override: Option<&Path>,
    text: &str,
    today: Option<&str>,
    local_only: bool,
    no_learn: bool,
    json: bool,
) -> Result<()> {
    let config = ParserConfig::load_or_default();
    let ledger = load_ledger(ledger_path)?;

    let today = match today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --today date format (use YYYY-MM-DD)")?,
        None => Local::now().date_naive(),
    };

    let mut gate = ConfidenceGate::new(&ledger.accounts, &ledger.categories, &config);
    if let Some(client) = RemoteClient::from_env() {
        debug!(host = client.host(), model = client.model(), "Remote backend configured");
        gate = gate.with_client(client);
    }
    let mut parsed = gate.parse(text, today, local_only).await;

    let prefs_path = prefs_path(prefs_override)?;
    let mut store = PreferenceStore::load(&config, &prefs_path)?;
    let now = Utc::now();

    // Prefill from history; nothing was manually overridden in a one-shot
    // CLI parse
    if let Some(kind) = parsed.kind {
        if let Some(hit) = store.lookup(kind, &parsed.description, now) {
            PreferenceStore::apply(
                &hit.pref,
                &mut parsed,
                &ledger.accounts,
                FieldOverrides::default(),
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        println!("Date:        {}", parsed.date);
        println!(
            "Amount:      {}",
            parsed
                .amount
                .map(|a| format!("{:.2}", a))
                .unwrap_or_else(|| "-".to_string())
        );
        println!(
            "Kind:        {}",
            parsed
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!("Account:     {}", show(&parsed.account_name));
        if parsed.to_account_name.is_some() {
            println!("To account:  {}", show(&parsed.to_account_name));
        }
        println!("Category:    {}", show(&parsed.category_name));
        println!("Description: {}", parsed.description);
    }

    if !no_learn {
        store.record_submission(&parsed, &ledger.accounts, now);
        store
            .save(&prefs_path)
            .with_context(|| format!("Failed to save preferences to {}", prefs_path.display()))?;
    }

    Ok(())
}

pub fn cmd_prefs_list(prefs_override: Option<&Path>) -> Result<()> {
    let config = ParserConfig::load_or_default();
    let prefs_path = prefs_path(prefs_override)?;
    let store = PreferenceStore::load(&config, &prefs_path)?;

    if store.is_empty() {
        println!("No learned preferences yet.");
        return Ok(());
    }

    println!(
        "{:<40} {:<10} {:<20} {:>5}  {}",
        "KEY", "KIND", "CATEGORY", "USES", "UPDATED"
    );
    let mut entries: Vec<_> = store.iter().collect();
    entries.sort_by(|a, b| b.1.updated_at.cmp(&a.1.updated_at));
    for (key, pref) in entries {
        println!(
            "{:<40} {:<10} {:<20} {:>5}  {}",
            key,
            pref.kind,
            pref.category.as_deref().unwrap_or("-"),
            pref.use_count,
            pref.updated_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

pub async fn cmd_remote_test(ledger_path: &Path, text: &str) -> Result<()> {
    let client = match RemoteClient::from_env() {
        Some(client) => client,
        None => {
            println!("No remote backend configured.");
            println!("Set JOT_REMOTE_HOST (and optionally JOT_REMOTE_MODEL) to enable one.");
            return Ok(());
        }
    };

    println!("Backend: {} ({})", client.host(), client.model());
    if !client.health_check().await {
        println!("Health check failed - is the server running?");
        return Ok(());
    }
    println!("Health check passed.");

    let ledger = load_ledger(ledger_path).unwrap_or(Ledger {
        accounts: Vec::new(),
        categories: Vec::new(),
    });
    let request = RemoteRequest {
        text: text.to_string(),
        today: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        accounts: ledger.accounts.iter().map(|a| a.name.clone()).collect(),
        income_categories: ledger
            .categories
            .iter()
            .filter(|c| c.kind.is_none() || c.kind == Some(jot_core::TransactionKind::Income))
            .map(|c| c.name.clone())
            .collect(),
        expense_categories: ledger
            .categories
            .iter()
            .filter(|c| c.kind.is_none() || c.kind == Some(jot_core::TransactionKind::Expense))
            .map(|c| c.name.clone())
            .collect(),
    };

    println!("Parsing: {:?}", text);
    match client.parse_entry(&request).await {
        Ok(parsed) => println!("{}", serde_json::to_string_pretty(&parsed)?),
        Err(e) => println!("Remote parse failed: {}", e),
    }
    Ok(())
}
