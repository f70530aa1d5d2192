//! Transaction kind classification
//!
//! Ordered rules evaluated top-to-bottom. Transfer beats income only when
//! two distinct accounts are unambiguous; otherwise income wins. This
//! ordering resolves "received/credited" appearing in both income and
//! transfer phrasing, and must be preserved.

use crate::models::TransactionKind;

/// Income nouns
const INCOME_KEYWORDS: &[&str] = &[
    "income",
    "salary",
    "wage",
    "payroll",
    "bonus",
    "refund",
    "reimburse",
    "dividend",
    "收入",
    "工资",
    "薪水",
    "奖金",
    "报销",
    "退款",
    "分红",
    "利息",
];

/// Income verb patterns
const INCOME_VERBS: &[&str] = &[
    "received",
    "credited",
    "got paid",
    "earned",
    "收到",
    "到账",
    "入账",
    "发了",
];

/// Evidence gathered by the extraction pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSignals {
    /// Count of distinct confident account mentions
    pub distinct_mentions: usize,
    /// Directional resolution produced two distinct accounts outright
    pub directional_pair: bool,
    /// An income keyword or verb pattern appears in the text
    pub income_signal: bool,
}

/// True when the normalized text carries any income keyword or verb pattern
pub fn has_income_signal(text: &str) -> bool {
    INCOME_KEYWORDS.iter().any(|kw| text.contains(kw))
        || INCOME_VERBS.iter().any(|kw| text.contains(kw))
}

/// Classify the transaction kind from the gathered signals
pub fn classify(signals: &TypeSignals) -> TransactionKind {
    type Rule = (fn(&TypeSignals) -> bool, TransactionKind);

    // Ordered dispatch table; the first matching predicate wins
    const RULES: &[Rule] = &[
        (|s| s.directional_pair, TransactionKind::Transfer),
        (
            |s| s.distinct_mentions >= 2 && !s.income_signal,
            TransactionKind::Transfer,
        ),
        (|s| s.income_signal, TransactionKind::Income),
    ];

    for (predicate, kind) in RULES {
        if predicate(signals) {
            return *kind;
        }
    }
    TransactionKind::Expense
}
