//! Parser configuration: named tuning constants with file override
//!
//! Every empirically-tuned constant (match thresholds, remote timeouts,
//! preference weights) lives here rather than inline at the use site.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/jot/config/parser.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/parser.toml");

/// Tuning constants for the extraction pipeline
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Minimum score for an account candidate to count as mentioned
    pub match_threshold: f64,
    /// Score boost when both input and candidate carry cash-class tokens
    pub cash_hint_boost: f64,
    /// Score boost when both input and candidate carry bank-class tokens
    pub bank_hint_boost: f64,
    /// Penalty when the input signals cash but the candidate signals bank
    pub hint_mismatch_penalty: f64,
    /// Minimum blended score for a fuzzy preference hit
    pub pref_threshold: f64,
    /// Recency window for preference scoring
    pub pref_recency_days: i64,
    /// use_count at which the usage component saturates
    pub pref_usage_saturation: u32,
    /// Budget for a standard remote augmentation call
    pub remote_timeout: Duration,
    /// Budget for the short-input fast path
    pub remote_timeout_short: Duration,
    /// Inputs at or under this many characters take the short-input fast path
    pub short_input_limit: usize,
    /// Category name used when the caller supplies no transfer-tagged category
    pub transfer_category: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.55,
            cash_hint_boost: 1.2,
            bank_hint_boost: 1.0,
            hint_mismatch_penalty: -0.6,
            pref_threshold: 0.55,
            pref_recency_days: 45,
            pref_usage_saturation: 8,
            remote_timeout: Duration::from_millis(2000),
            remote_timeout_short: Duration::from_millis(1800),
            short_input_limit: 28,
            transfer_category: "Transfer".to_string(),
        }
    }
}

/// On-disk config file shape (all sections optional so overrides can be partial)
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    matching: MatchingSection,
    #[serde(default)]
    preferences: PreferencesSection,
    #[serde(default)]
    remote: RemoteSection,
    #[serde(default)]
    categories: CategoriesSection,
}

#[derive(Debug, Deserialize, Default)]
struct MatchingSection {
    match_threshold: Option<f64>,
    cash_hint_boost: Option<f64>,
    bank_hint_boost: Option<f64>,
    hint_mismatch_penalty: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct PreferencesSection {
    pref_threshold: Option<f64>,
    pref_recency_days: Option<i64>,
    pref_usage_saturation: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct RemoteSection {
    timeout_ms: Option<u64>,
    timeout_short_ms: Option<u64>,
    short_input_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct CategoriesSection {
    transfer_category: Option<String>,
}

impl ParserConfig {
    /// Load config: data-dir override if present, embedded defaults otherwise
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::override_path() {
            if path.exists() {
                debug!(path = %path.display(), "Loading parser config override");
                let content = fs::read_to_string(&path)?;
                return Self::from_toml(&content);
            }
        }
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Load config, falling back to compiled defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!("Failed to load parser config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Parse a TOML config document, filling gaps from the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid parser config: {}", e)))?;

        let base = Self::default();
        Ok(Self {
            match_threshold: file.matching.match_threshold.unwrap_or(base.match_threshold),
            cash_hint_boost: file.matching.cash_hint_boost.unwrap_or(base.cash_hint_boost),
            bank_hint_boost: file.matching.bank_hint_boost.unwrap_or(base.bank_hint_boost),
            hint_mismatch_penalty: file
                .matching
                .hint_mismatch_penalty
                .unwrap_or(base.hint_mismatch_penalty),
            pref_threshold: file
                .preferences
                .pref_threshold
                .unwrap_or(base.pref_threshold),
            pref_recency_days: file
                .preferences
                .pref_recency_days
                .unwrap_or(base.pref_recency_days),
            pref_usage_saturation: file
                .preferences
                .pref_usage_saturation
                .unwrap_or(base.pref_usage_saturation),
            remote_timeout: file
                .remote
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(base.remote_timeout),
            remote_timeout_short: file
                .remote
                .timeout_short_ms
                .map(Duration::from_millis)
                .unwrap_or(base.remote_timeout_short),
            short_input_limit: file
                .remote
                .short_input_limit
                .unwrap_or(base.short_input_limit),
            transfer_category: file
                .categories
                .transfer_category
                .unwrap_or(base.transfer_category),
        })
    }

    /// Path of the optional override file in the platform data dir
    pub fn override_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("jot").join("config").join("parser.toml"))
    }
}
