//! Confidence gate and remote augmentation
//!
//! The local parse (the "fallback") is always computed first and is always
//! safe to return. The gate decides whether a remote call could improve it,
//! races that call against a fixed budget, and reconciles the winner with
//! local evidence. Nothing in here errors past the public entry point: a
//! remote failure or timeout degrades to the fallback.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::accounts::AccountResolver;
use crate::ai::{RemoteBackend, RemoteClient, RemoteParse, RemoteRequest};
use crate::category::has_category_evidence;
use crate::config::ParserConfig;
use crate::models::{Account, Category, ParsedInput, TransactionKind};
use crate::normalize::normalize;
use crate::parser::EntryParser;

/// Public entry point: local pipeline plus gated remote augmentation
pub struct ConfidenceGate<'a> {
    accounts: &'a [Account],
    categories: &'a [Category],
    config: &'a ParserConfig,
    client: Option<RemoteClient>,
}

impl<'a> ConfidenceGate<'a> {
    pub fn new(
        accounts: &'a [Account],
        categories: &'a [Category],
        config: &'a ParserConfig,
    ) -> Self {
        Self {
            accounts,
            categories,
            config,
            client: None,
        }
    }

    /// Attach a remote client; without one, parsing is local-only
    pub fn with_client(mut self, client: RemoteClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Parse one entry, augmenting with the remote service when the local
    /// result looks unresolved and the caller allows it
    pub async fn parse(&self, text: &str, today: NaiveDate, local_only: bool) -> ParsedInput {
        let parser = EntryParser::new(self.accounts, self.categories, self.config);
        let fallback = parser.parse_local(text, today);

        let client = match (&self.client, local_only) {
            (Some(client), false) => client,
            _ => return fallback,
        };

        if self.looks_resolved(text, &fallback) {
            debug!("Fallback looks resolved, skipping remote call");
            return fallback;
        }
        // Transfers rarely benefit from augmentation once both sides are known
        if fallback.kind == Some(TransactionKind::Transfer)
            && fallback.account_name.is_some()
            && fallback.to_account_name.is_some()
            && fallback.account_name != fallback.to_account_name
        {
            debug!("Transfer with both sides resolved, skipping remote call");
            return fallback;
        }

        let timeout = if text.chars().count() <= self.config.short_input_limit {
            self.config.remote_timeout_short
        } else {
            self.config.remote_timeout
        };

        let request = self.build_request(text, today);
        let call = {
            let client = client.clone();
            tokio::spawn(async move { client.parse_entry(&request).await })
        };

        // First to settle wins; dropping the JoinHandle detaches the loser,
        // which keeps running but its result is discarded
        let remote = tokio::select! {
            joined = call => match joined {
                Ok(Ok(remote)) => Some(remote),
                Ok(Err(e)) => {
                    warn!("Remote parse failed, using fallback: {}", e);
                    None
                }
                Err(e) => {
                    warn!("Remote parse task aborted, using fallback: {}", e);
                    None
                }
            },
            _ = tokio::time::sleep(timeout) => {
                warn!(?timeout, "Remote parse timed out, using fallback");
                None
            }
        };

        match remote {
            Some(remote) => self.merge(text, &parser, fallback, remote),
            None => fallback,
        }
    }

    /// The fallback already has everything a confirmed entry needs
    fn looks_resolved(&self, text: &str, fallback: &ParsedInput) -> bool {
        let has_amount = fallback.amount.map_or(false, |a| a > 0.0);
        let has_source = fallback.account_name.is_some();
        let has_category = fallback.category_name.is_some();

        if fallback.kind == Some(TransactionKind::Transfer) {
            return has_amount
                && has_source
                && fallback.to_account_name.is_some()
                && fallback.to_account_name != fallback.account_name;
        }

        let full = has_amount && has_source && has_category && !fallback.description.is_empty();
        let short = text.chars().count() <= self.config.short_input_limit
            && has_amount
            && has_source
            && has_category;
        full || short
    }

    fn build_request(&self, text: &str, today: NaiveDate) -> RemoteRequest {
        let usable = |c: &&Category, kind: TransactionKind| {
            c.kind.is_none() || c.kind == Some(kind)
        };
        RemoteRequest {
            text: text.to_string(),
            today: today.format("%Y-%m-%d").to_string(),
            accounts: self.accounts.iter().map(|a| a.name.clone()).collect(),
            income_categories: self
                .categories
                .iter()
                .filter(|c| usable(c, TransactionKind::Income))
                .map(|c| c.name.clone())
                .collect(),
            expense_categories: self
                .categories
                .iter()
                .filter(|c| usable(c, TransactionKind::Expense))
                .map(|c| c.name.clone())
                .collect(),
        }
    }

    /// Reconcile the remote result with local evidence
    ///
    /// Remote fields win, except: literal account mentions in the input
    /// always override the remote's account guesses, the description is
    /// re-cleaned so raw account text never surfaces, and unambiguous local
    /// keyword evidence keeps the fallback's category.
    fn merge(
        &self,
        text: &str,
        parser: &EntryParser<'_>,
        fallback: ParsedInput,
        remote: RemoteParse,
    ) -> ParsedInput {
        let mut merged = fallback.clone();

        if let Some(amount) = remote.amount.filter(|a| *a >= 0.0) {
            merged.amount = Some(amount);
        }
        if let Some(kind) = remote.kind.as_deref().and_then(|k| k.parse().ok()) {
            merged.kind = Some(kind);
        }
        if let Some(name) = remote.account_name.clone().filter(|n| !n.is_empty()) {
            merged.account_name = Some(name);
        }
        if let Some(name) = remote.to_account_name.clone().filter(|n| !n.is_empty()) {
            merged.to_account_name = Some(name);
        }
        if let Some(name) = remote.category_name.clone().filter(|n| !n.is_empty()) {
            merged.category_name = Some(name);
        }
        if let Some(date) = remote
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        {
            merged.date = date;
        }

        // Literal mentions in the input trump remote account guesses, in
        // text order: first is the source, the next distinct one the target
        let resolver = AccountResolver::new(self.accounts, self.config);
        let mentions = resolver.mentions(text);
        let mut literal: Vec<_> = mentions
            .iter()
            .filter(|m| m.position.is_some())
            .collect();
        literal.sort_by_key(|m| m.position);
        if let Some(first) = literal.first() {
            merged.account_name = Some(first.account.name.clone());
            if merged.kind == Some(TransactionKind::Transfer) {
                if let Some(second) = literal
                    .iter()
                    .find(|m| m.account.id != first.account.id)
                {
                    merged.to_account_name = Some(second.account.name.clone());
                }
            }
        }
        // A transfer never carries the same account on both sides
        if merged.kind == Some(TransactionKind::Transfer)
            && merged.to_account_name == merged.account_name
        {
            merged.to_account_name = None;
        }

        // Never surface raw, unstripped account text to the user
        let description_source = remote
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| text.to_string());
        merged.description = parser.clean_description(&description_source, &mentions);

        // Unambiguous local keyword evidence beats the remote's category
        if let Some(kind) = merged.kind {
            if kind != TransactionKind::Transfer
                && has_category_evidence(&normalize(text), kind)
                && fallback.category_name.is_some()
            {
                merged.category_name = fallback.category_name;
            }
        }

        debug!(
            amount = ?merged.amount,
            kind = ?merged.kind,
            "Merged remote parse with local fallback"
        );
        merged
    }
}
