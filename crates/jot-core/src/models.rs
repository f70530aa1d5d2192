//! Domain models for jot

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of transaction a parsed entry resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account supplied by the caller (read-only per parse)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
}

/// A category supplied by the caller (read-only per parse)
///
/// `kind: None` means the category is usable for any transaction kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub kind: Option<TransactionKind>,
}

/// The output contract: a structured transaction record parsed from free text
///
/// Any field except `date` and `description` may be absent; callers must
/// handle missing fields (an extraction miss is not an error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedInput {
    /// Non-negative, possibly fractional
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    /// Resolved source account display name
    #[serde(default)]
    pub account_name: Option<String>,
    /// Resolved target account name; meaningful only when kind is transfer
    #[serde(default)]
    pub to_account_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub date: NaiveDate,
    /// Input text with amounts, dates, and account mentions stripped
    pub description: String,
}

impl ParsedInput {
    /// An empty record dated `date` with the raw text as description
    pub fn bare(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            amount: None,
            kind: None,
            account_name: None,
            to_account_name: None,
            category_name: None,
            date,
            description: description.into(),
        }
    }
}

/// A learned per-description preference record
///
/// `use_count` only increases; `updated_at` is set to the write time on every
/// upsert. Records are never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPref {
    pub kind: TransactionKind,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub to_account_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub use_count: u32,
}
