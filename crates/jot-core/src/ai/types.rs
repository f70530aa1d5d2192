//! Remote backend request/response types
//!
//! These types are backend-agnostic and used across all remote
//! implementations.

use serde::{Deserialize, Serialize};

/// Context shipped to the remote language-understanding service
#[derive(Debug, Clone, Default)]
pub struct RemoteRequest {
    /// The raw user input
    pub text: String,
    /// Caller-supplied local date, ISO formatted
    pub today: String,
    /// Known account names
    pub accounts: Vec<String>,
    /// Category names usable for income entries
    pub income_categories: Vec<String>,
    /// Category names usable for expense entries
    pub expense_categories: Vec<String>,
}

/// Structured parse returned by the remote service
///
/// Every field is optional: the service fills what it understood and the
/// merge layer reconciles the rest. Field aliases tolerate the camelCase
/// spelling some deployments return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteParse {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "accountName")]
    pub account_name: Option<String>,
    #[serde(default, alias = "toAccountName")]
    pub to_account_name: Option<String>,
    #[serde(default, alias = "categoryName")]
    pub category_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}
