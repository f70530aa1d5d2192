//! Learned preference store
//!
//! A per-description cache of the user's historical field choices, used to
//! prefill future entries. Keys combine the transaction kind with the
//! normalized description, so spelling variants collide to one record.
//! Lookup is exact first, then similarity-weighted fuzzy; writes merge into
//! the matched key and only ever increase `use_count`. Records are never
//! deleted here; that is a storage-layer concern.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::models::{Account, LearnedPref, ParsedInput, TransactionKind};
use crate::normalize::{normalize, similarity};

/// Weight of description similarity in the blended lookup score
const SIMILARITY_WEIGHT: f64 = 0.7;
/// Weight of recency in the blended lookup score
const RECENCY_WEIGHT: f64 = 0.2;
/// Weight of usage in the blended lookup score
const USAGE_WEIGHT: f64 = 0.1;

/// Snapshot format written to disk
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, LearnedPref>,
}

/// A lookup hit: the matched key plus the stored record
#[derive(Debug, Clone)]
pub struct PrefMatch {
    pub key: String,
    pub pref: LearnedPref,
}

/// Fields the caller has manually overridden since the description last
/// changed; prefill leaves these alone
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOverrides {
    pub account: bool,
    pub to_account: bool,
    pub category: bool,
}

pub struct PreferenceStore {
    entries: HashMap<String, LearnedPref>,
    config: ParserConfig,
}

impl PreferenceStore {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config: config.clone(),
        }
    }

    /// Build the store key for a (kind, description) pair
    pub fn key(kind: TransactionKind, description: &str) -> String {
        format!("{}|{}", kind.as_str(), normalize(description))
    }

    /// Default snapshot location in the platform data dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("jot").join("preferences.json"))
    }

    /// Load a snapshot from disk; a missing file yields an empty store
    pub fn load(config: &ParserConfig, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(config));
        }
        let content = fs::read_to_string(path)?;
        let file: StoreFile = serde_json::from_str(&content)?;
        debug!(entries = file.entries.len(), "Loaded preference store");
        Ok(Self {
            entries: file.entries,
            config: config.clone(),
        })
    }

    /// Persist the store atomically (temp file, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            version: 1,
            entries: self.entries.clone(),
        };
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate stored records (for listing)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LearnedPref)> + '_ {
        self.entries.iter()
    }

    /// Look up a preference: exact key first, then the best fuzzy match at
    /// or above the configured threshold
    pub fn lookup(
        &self,
        kind: TransactionKind,
        description: &str,
        now: DateTime<Utc>,
    ) -> Option<PrefMatch> {
        let key = Self::key(kind, description);
        if let Some(pref) = self.entries.get(&key) {
            return Some(PrefMatch {
                key,
                pref: pref.clone(),
            });
        }

        let normalized = normalize(description);
        if normalized.is_empty() {
            return None;
        }
        let prefix = format!("{}|", kind.as_str());

        let mut best: Option<(f64, &String, &LearnedPref)> = None;
        for (stored_key, pref) in &self.entries {
            let stored_norm = match stored_key.strip_prefix(&prefix) {
                Some(rest) => rest,
                None => continue,
            };
            let score = self.blended_score(&normalized, stored_norm, pref, now);
            if best.map_or(true, |(b, _, _)| score > b) {
                best = Some((score, stored_key, pref));
            }
        }

        match best {
            Some((score, stored_key, pref)) if score >= self.config.pref_threshold => {
                debug!(score, key = %stored_key, "Fuzzy preference hit");
                Some(PrefMatch {
                    key: stored_key.clone(),
                    pref: pref.clone(),
                })
            }
            _ => None,
        }
    }

    /// Blend similarity, recency, and usage into one score
    fn blended_score(
        &self,
        input_norm: &str,
        stored_norm: &str,
        pref: &LearnedPref,
        now: DateTime<Utc>,
    ) -> f64 {
        let sim = similarity(input_norm, stored_norm);
        let age_days = (now - pref.updated_at).num_seconds() as f64 / 86_400.0;
        let recency = (1.0 - age_days / self.config.pref_recency_days as f64).max(0.0);
        let usage = (pref.use_count as f64 / self.config.pref_usage_saturation as f64).min(1.0);
        SIMILARITY_WEIGHT * sim + RECENCY_WEIGHT * recency + USAGE_WEIGHT * usage
    }

    /// Merge-write at the exact key: `use_count` increments from any prior
    /// value (0 if none), the rest is overwritten
    pub fn upsert(&mut self, key: String, mut pref: LearnedPref) {
        let prior = self.entries.get(&key).map(|p| p.use_count).unwrap_or(0);
        pref.use_count = prior + 1;
        self.entries.insert(key, pref);
    }

    /// Learn from a confirmed submission
    ///
    /// A non-empty description is required. The write lands on the exact key
    /// unless the description fuzzy-resolves to an existing record, in which
    /// case that record is updated rather than a near-duplicate minted.
    pub fn record_submission(
        &mut self,
        parsed: &ParsedInput,
        accounts: &[Account],
        now: DateTime<Utc>,
    ) {
        let kind = match parsed.kind {
            Some(kind) => kind,
            None => return,
        };
        if normalize(&parsed.description).is_empty() {
            return;
        }

        let key = self
            .lookup(kind, &parsed.description, now)
            .map(|hit| hit.key)
            .unwrap_or_else(|| Self::key(kind, &parsed.description));

        let account_id = |name: &Option<String>| {
            name.as_deref()
                .and_then(|n| accounts.iter().find(|a| a.name == n))
                .map(|a| a.id)
        };

        self.upsert(
            key,
            LearnedPref {
                kind,
                account_id: account_id(&parsed.account_name),
                to_account_id: account_id(&parsed.to_account_name),
                category: parsed.category_name.clone(),
                updated_at: now,
                use_count: 0,
            },
        );
    }

    /// Prefill a parsed entry from a stored preference, honoring fields the
    /// caller has manually overridden
    pub fn apply(
        pref: &LearnedPref,
        parsed: &mut ParsedInput,
        accounts: &[Account],
        overrides: FieldOverrides,
    ) {
        let name_of = |id: Option<i64>| {
            id.and_then(|id| accounts.iter().find(|a| a.id == id))
                .map(|a| a.name.clone())
        };

        parsed.kind = Some(pref.kind);
        if !overrides.account {
            if let Some(name) = name_of(pref.account_id) {
                parsed.account_name = Some(name);
            }
        }
        if !overrides.to_account {
            if let Some(name) = name_of(pref.to_account_id) {
                parsed.to_account_name = Some(name);
            }
        }
        if !overrides.category {
            if let Some(category) = &pref.category {
                parsed.category_name = Some(category.clone());
            }
        }
    }
}
