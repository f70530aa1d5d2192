//! Local extraction pipeline
//!
//! `EntryParser` runs the heuristic pipeline over one input: normalize,
//! extract amount/date/account mentions, classify the kind, infer the
//! category, and strip the recognized pieces out of the description. The
//! result (the "fallback") is always structurally valid and safe to return,
//! whatever the remote augmentation layer later decides.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::accounts::{
    AccountResolver, Mention, ACCOUNT_SUFFIXES, BANK_TOKENS, CASH_TOKENS, DIRECTION_CONNECTORS,
};
use crate::amount::extract_amount;
use crate::category::{infer_category, transfer_category};
use crate::classify::{classify, has_income_signal, TypeSignals};
use crate::config::ParserConfig;
use crate::date::resolve_date;
use crate::models::{Account, Category, ParsedInput, TransactionKind};
use crate::normalize::normalize;

/// Date words removed from descriptions alongside the numeric patterns
const DATE_WORDS: &[&str] = &[
    "day before yesterday",
    "yesterday",
    "today",
    "前天",
    "昨天",
    "今天",
    "前日",
    "昨日",
];

/// Currency words that orphan once the numeral next to them is stripped
const CURRENCY_TOKENS: &[&str] = &["元", "块钱", "块", "rmb", "yuan", "dollars", "bucks"];

/// Source-side filler around account mentions
const FILLER_WORDS: &[&str] = &["from", "从", "由"];

pub struct EntryParser<'a> {
    accounts: &'a [Account],
    categories: &'a [Category],
    config: &'a ParserConfig,
}

impl<'a> EntryParser<'a> {
    pub fn new(
        accounts: &'a [Account],
        categories: &'a [Category],
        config: &'a ParserConfig,
    ) -> Self {
        Self {
            accounts,
            categories,
            config,
        }
    }

    /// Run the full local pipeline over one input
    pub fn parse_local(&self, text: &str, today: NaiveDate) -> ParsedInput {
        let resolver = AccountResolver::new(self.accounts, self.config);
        let normalized = normalize(text);

        let amount = extract_amount(text);
        let date = resolve_date(today, text);
        let mentions = resolver.mentions(text);
        let resolution = resolver.resolve_transfer(text);

        let signals = TypeSignals {
            distinct_mentions: mentions.len(),
            directional_pair: resolution.directional && resolution.is_pair(),
            income_signal: has_income_signal(&normalized),
        };
        let mut kind = classify(&signals);

        // A transfer requires two distinct resolved accounts
        if kind == TransactionKind::Transfer && !resolution.is_pair() {
            kind = if signals.income_signal {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            };
        }

        let (account_name, to_account_name) = match kind {
            TransactionKind::Transfer => (
                resolution.source.map(|a| a.name.clone()),
                resolution.target.map(|a| a.name.clone()),
            ),
            _ => (mentions.first().map(|m| m.account.name.clone()), None),
        };

        let category_name = match kind {
            TransactionKind::Transfer => {
                Some(transfer_category(self.categories, &self.config.transfer_category))
            }
            _ => infer_category(&normalized, self.categories, kind),
        };

        let description = self.clean_description(text, &mentions);

        debug!(
            ?amount,
            kind = %kind,
            account = account_name.as_deref().unwrap_or("-"),
            "Local parse complete"
        );

        ParsedInput {
            amount,
            kind: Some(kind),
            account_name,
            to_account_name,
            category_name,
            date,
            description,
        }
    }

    /// Strip amounts, dates, account mentions, and account keyword words
    /// from the text, leaving the user's own description
    pub fn clean_description(&self, text: &str, mentions: &[Mention<'_>]) -> String {
        let mut out = text.to_string();

        // Dates first so their digits can't be taken for amounts below
        let full_date = Regex::new(r"\d{4}[/-]\d{1,2}[/-]\d{1,2}").expect("valid regex");
        out = full_date.replace_all(&out, " ").into_owned();
        let short_date = Regex::new(r"\b\d{1,2}/\d{1,2}\b").expect("valid regex");
        out = short_date.replace_all(&out, " ").into_owned();
        for word in DATE_WORDS {
            out = remove_word_ci(&out, word);
        }

        // The first remaining numeral is the amount
        let number = Regex::new(r"\d+(?:\.\d+)?").expect("valid regex");
        out = number.replace(&out, " ").into_owned();

        // Account mentions, longest aliases first so fragments don't leave
        // partial words behind
        let mut aliases: Vec<String> = mentions
            .iter()
            .flat_map(|m| AccountResolver::aliases(&m.account.name))
            .collect();
        aliases.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        for alias in &aliases {
            out = remove_word_ci(&out, alias);
        }

        // Account keyword words left over around the mentions
        for word in CASH_TOKENS.iter().chain(BANK_TOKENS).chain(ACCOUNT_SUFFIXES) {
            out = remove_word_ci(&out, word);
        }
        // Connector/filler words only read as account phrasing when an
        // account was actually mentioned
        if !mentions.is_empty() {
            for connector in DIRECTION_CONNECTORS {
                let trimmed = connector.trim();
                if !trimmed.is_empty() {
                    out = remove_word_ci(&out, trimmed);
                }
            }
            for word in FILLER_WORDS {
                out = remove_word_ci(&out, word);
            }
        }
        for token in CURRENCY_TOKENS {
            out = remove_word_ci(&out, token);
        }

        // Collapse leftover separators and whitespace
        let separators = Regex::new(r"[,，、;；:：]+").expect("valid regex");
        out = separators.replace_all(&out, " ").into_owned();
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Remove `needle` only when it stands alone: ASCII needles get word
/// boundaries, CJK needles match anywhere (CJK has no word boundaries)
fn remove_word_ci(text: &str, needle: &str) -> String {
    let pattern = if needle.is_ascii() {
        format!(r"(?i)\b{}\b", regex::escape(needle))
    } else {
        format!("(?i){}", regex::escape(needle))
    };
    let pattern = Regex::new(&pattern).expect("valid regex");
    pattern.replace_all(text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Vec<Account> {
        vec![
            Account {
                id: 1,
                name: "Cash".into(),
            },
            Account {
                id: 2,
                name: "Bank Account".into(),
            },
        ]
    }

    fn categories() -> Vec<Category> {
        vec![
            Category {
                name: "Food & Dining".into(),
                kind: Some(TransactionKind::Expense),
            },
            Category {
                name: "Salary".into(),
                kind: Some(TransactionKind::Income),
            },
            Category {
                name: "Transfer".into(),
                kind: Some(TransactionKind::Transfer),
            },
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_expense_scenario() {
        let accounts = accounts();
        let categories = categories();
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("lunch 180 cash, today", today());
        assert_eq!(parsed.amount, Some(180.0));
        assert_eq!(parsed.kind, Some(TransactionKind::Expense));
        assert_eq!(parsed.account_name.as_deref(), Some("Cash"));
        assert_eq!(parsed.to_account_name, None);
        assert_eq!(parsed.category_name.as_deref(), Some("Food & Dining"));
        assert_eq!(parsed.date, today());
        assert_eq!(parsed.description, "lunch");
    }

    #[test]
    fn test_transfer_scenario() {
        let accounts = accounts();
        let categories = categories();
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("transfer 500 from Cash to Bank Account", today());
        assert_eq!(parsed.amount, Some(500.0));
        assert_eq!(parsed.kind, Some(TransactionKind::Transfer));
        assert_eq!(parsed.account_name.as_deref(), Some("Cash"));
        assert_eq!(parsed.to_account_name.as_deref(), Some("Bank Account"));
        assert_eq!(parsed.category_name.as_deref(), Some("Transfer"));
    }

    #[test]
    fn test_transfer_accounts_are_distinct() {
        let accounts = accounts();
        let categories = categories();
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("move 100 from cash to cash", today());
        assert_ne!(parsed.kind, Some(TransactionKind::Transfer));
    }

    #[test]
    fn test_income_scenario() {
        let accounts = accounts();
        let categories = categories();
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("salary 50000", today());
        assert_eq!(parsed.kind, Some(TransactionKind::Income));
        assert_eq!(parsed.amount, Some(50000.0));
        assert_eq!(parsed.category_name.as_deref(), Some("Salary"));
    }

    #[test]
    fn test_amount_date_non_interference() {
        let accounts = accounts();
        let categories = categories();
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("dinner 2024/3/5 180", today());
        assert_eq!(parsed.amount, Some(180.0));
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_description_strips_recognized_pieces() {
        let accounts = accounts();
        let categories = categories();
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("coffee with Li 25.5 cash yesterday", today());
        assert_eq!(parsed.description, "coffee with Li");
        assert_eq!(
            parsed.date,
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_cjk_expense() {
        let accounts = vec![
            Account {
                id: 1,
                name: "现金".into(),
            },
            Account {
                id: 2,
                name: "招商银行".into(),
            },
        ];
        let categories = vec![Category {
            name: "餐饮".into(),
            kind: Some(TransactionKind::Expense),
        }];
        let config = ParserConfig::default();
        let parser = EntryParser::new(&accounts, &categories, &config);

        let parsed = parser.parse_local("午饭180现金", today());
        assert_eq!(parsed.amount, Some(180.0));
        assert_eq!(parsed.kind, Some(TransactionKind::Expense));
        assert_eq!(parsed.account_name.as_deref(), Some("现金"));
        assert_eq!(parsed.category_name.as_deref(), Some("餐饮"));
    }
}
