//! Account resolution: map free text to known accounts
//!
//! Alias generation lets a user type a shorthand ("cash", "招商") and still
//! match a longer formal account name ("Cash Wallet", "招商银行储蓄卡").
//! Scoring combines verbatim alias containment, character overlap, and a
//! cash/bank hint boost; candidates at or above the configured threshold are
//! "mentioned". Directional resolution orders two mentions into a transfer
//! source and target.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::ParserConfig;
use crate::models::Account;
use crate::normalize::{char_overlap, normalize};

/// Suffix vocabulary stripped when generating aliases, longest first so
/// compound suffixes win over their tails
pub(crate) const ACCOUNT_SUFFIXES: &[&str] = &[
    "savings account",
    "checking account",
    "credit card",
    "debit card",
    "account",
    "wallet",
    "bank",
    "card",
    "储蓄卡",
    "信用卡",
    "借记卡",
    "账户",
    "账号",
    "钱包",
    "银行",
    "存折",
    "卡",
];

/// Tokens marking cash-class accounts and inputs
pub(crate) const CASH_TOKENS: &[&str] = &["cash", "现金"];

/// Tokens marking bank-class accounts and inputs
pub(crate) const BANK_TOKENS: &[&str] = &["bank", "card", "银行", "储蓄", "信用", "借记"];

/// Direction connectors for transfers; Latin forms carry their own spacing
/// so "into" can't fire inside another word
pub(crate) const DIRECTION_CONNECTORS: &[&str] = &[
    " given to ",
    " into ",
    " to ",
    "转到",
    "转入",
    "转给",
    "存入",
    "还到",
    "到",
    "给",
];

/// A confident account mention in the input text
#[derive(Debug, Clone)]
pub struct Mention<'a> {
    pub account: &'a Account,
    pub score: f64,
    /// Earliest byte offset of a verbatim alias hit in the normalized input,
    /// if any; used to order fallback transfer pairs by text order
    pub position: Option<usize>,
}

/// Result of directional (transfer) resolution
#[derive(Debug, Clone, Default)]
pub struct TransferResolution<'a> {
    pub source: Option<&'a Account>,
    pub target: Option<&'a Account>,
    /// True when the pair came from an explicit direction connector split
    pub directional: bool,
}

impl<'a> TransferResolution<'a> {
    /// Two distinct accounts were resolved
    pub fn is_pair(&self) -> bool {
        match (self.source, self.target) {
            (Some(s), Some(t)) => s.id != t.id,
            _ => false,
        }
    }
}

pub struct AccountResolver<'a> {
    accounts: &'a [Account],
    config: &'a ParserConfig,
}

impl<'a> AccountResolver<'a> {
    pub fn new(accounts: &'a [Account], config: &'a ParserConfig) -> Self {
        Self { accounts, config }
    }

    /// Generate the normalized alias set for an account name
    ///
    /// The set contains the normalized name, every suffix-stripped form, the
    /// separator fragments of length >= 2, and the 2/3/4-character prefixes
    /// of the fully stripped base form.
    pub fn aliases(name: &str) -> BTreeSet<String> {
        let normalized = normalize(name);
        let mut aliases = BTreeSet::new();
        if normalized.is_empty() {
            return aliases;
        }
        aliases.insert(normalized.clone());

        // Strip suffix words repeatedly; each intermediate form is an alias
        let mut base = normalized.clone();
        loop {
            let mut stripped = None;
            for suffix in ACCOUNT_SUFFIXES {
                if let Some(rest) = base.strip_suffix(suffix) {
                    let rest = rest.trim();
                    if rest.chars().count() >= 2 {
                        stripped = Some(rest.to_string());
                        break;
                    }
                }
            }
            match stripped {
                Some(rest) => {
                    aliases.insert(rest.clone());
                    base = rest;
                }
                None => break,
            }
        }

        for fragment in normalized.split_whitespace() {
            if fragment.chars().count() >= 2 {
                aliases.insert(fragment.to_string());
            }
        }

        for len in [2usize, 3, 4] {
            if base.chars().count() > len {
                let prefix: String = base.chars().take(len).collect();
                let prefix = prefix.trim().to_string();
                if prefix.chars().count() >= 2 {
                    aliases.insert(prefix);
                }
            }
        }

        aliases
    }

    fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| haystack.contains(t))
    }

    /// Score one account against the normalized input
    ///
    /// The score is the max over aliases of verbatim containment
    /// (chars + 1, favoring longer aliases) and character overlap, raced
    /// against the hint boost; a cash-input/bank-candidate mismatch is
    /// penalized after the max.
    fn score(&self, input: &str, account: &Account) -> (f64, Option<usize>) {
        let mut best = 0.0_f64;
        let mut position = None;

        for alias in Self::aliases(&account.name) {
            if let Some(idx) = input.find(alias.as_str()) {
                let contained = alias.chars().count() as f64 + 1.0;
                if contained > best {
                    best = contained;
                }
                position = Some(position.map_or(idx, |p: usize| p.min(idx)));
            } else {
                let overlap = char_overlap(input, &alias);
                if overlap > best {
                    best = overlap;
                }
            }
        }

        let name = normalize(&account.name);
        let candidate_cash = Self::contains_any(&name, CASH_TOKENS);
        let candidate_bank = Self::contains_any(&name, BANK_TOKENS);
        let input_cash = Self::contains_any(input, CASH_TOKENS);
        let input_bank = Self::contains_any(input, BANK_TOKENS);

        if input_cash && candidate_cash {
            best = best.max(self.config.cash_hint_boost);
        } else if input_bank && candidate_bank && !candidate_cash {
            best = best.max(self.config.bank_hint_boost);
        }
        if input_cash && !input_bank && candidate_bank && !candidate_cash {
            best += self.config.hint_mismatch_penalty;
        }

        (best, position)
    }

    /// Accounts mentioned in the text, ordered by score, de-duplicated by id
    pub fn mentions(&self, text: &str) -> Vec<Mention<'a>> {
        let input = normalize(text);
        let mut by_id: HashMap<i64, Mention<'a>> = HashMap::new();

        for account in self.accounts {
            let (score, position) = self.score(&input, account);
            if score < self.config.match_threshold {
                continue;
            }
            match by_id.get(&account.id) {
                Some(existing) if existing.score >= score => {}
                _ => {
                    by_id.insert(
                        account.id,
                        Mention {
                            account,
                            score,
                            position,
                        },
                    );
                }
            }
        }

        let mut mentions: Vec<Mention<'a>> = by_id.into_values().collect();
        mentions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.account.id.cmp(&b.account.id))
        });
        debug!(
            count = mentions.len(),
            "Resolved account mentions from input"
        );
        mentions
    }

    /// First cash-like account other than `exclude`
    fn implicit_cash_target(&self, exclude: Option<&Account>) -> Option<&'a Account> {
        self.accounts.iter().find(|a| {
            Self::contains_any(&normalize(&a.name), CASH_TOKENS)
                && exclude.map_or(true, |e| e.id != a.id)
        })
    }

    /// Resolve a transfer source and target from the text
    ///
    /// Priority: split on the last direction connector and search each side;
    /// then fall back to the two highest-scoring mentions in text order; an
    /// explicit cash word supplies the implicit target when none was found.
    /// Source and target never resolve to the same account.
    pub fn resolve_transfer(&self, text: &str) -> TransferResolution<'a> {
        let input = normalize(text);

        // Last connector occurrence wins, so "a to b to c" splits before "c"
        let split = DIRECTION_CONNECTORS
            .iter()
            .filter_map(|c| input.rfind(c).map(|idx| (idx, c.len())))
            .max_by_key(|(idx, _)| *idx);

        if let Some((idx, len)) = split {
            let (left, right) = (&input[..idx], &input[idx + len..]);
            let source = self.mentions(left).into_iter().next().map(|m| m.account);
            let mut target = self.mentions(right).into_iter().next().map(|m| m.account);

            if target.is_none() && Self::contains_any(&input, CASH_TOKENS) {
                target = self.implicit_cash_target(source);
            }
            if let (Some(s), Some(t)) = (source, target) {
                if s.id != t.id {
                    debug!(source = %s.name, target = %t.name, "Directional transfer split");
                    return TransferResolution {
                        source: Some(s),
                        target: Some(t),
                        directional: true,
                    };
                }
            }
        }

        // Fallback: two highest-scoring mentions, ordered by text position
        let mentions = self.mentions(text);
        if mentions.len() >= 2 {
            let mut pair = [&mentions[0], &mentions[1]];
            let positions = (pair[0].position, pair[1].position);
            if let (Some(a), Some(b)) = positions {
                if b < a {
                    pair.swap(0, 1);
                }
            }
            return TransferResolution {
                source: Some(pair[0].account),
                target: Some(pair[1].account),
                directional: false,
            };
        }

        let mut resolution = TransferResolution {
            source: mentions.first().map(|m| m.account),
            target: None,
            directional: false,
        };
        if resolution.source.is_some() && Self::contains_any(&input, CASH_TOKENS) {
            let implicit = self.implicit_cash_target(resolution.source);
            // Only an account other than the source qualifies
            if let Some(t) = implicit {
                if resolution.source.map_or(false, |s| s.id != t.id) {
                    resolution.target = implicit;
                }
            }
        }
        resolution
    }
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
            Account {
                id: 3,
                name: "招商银行储蓄卡".into(),
            },
        ]
    }

    fn config() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn test_aliases_include_suffix_stripped_and_prefixes() {
        let aliases = AccountResolver::aliases("招商银行储蓄卡");
        assert!(aliases.contains("招商银行储蓄卡"));
        assert!(aliases.contains("招商银行"));
        assert!(aliases.contains("招商"));
    }

    #[test]
    fn test_aliases_include_fragments() {
        let aliases = AccountResolver::aliases("Bank Account");
        assert!(aliases.contains("bank account"));
        assert!(aliases.contains("bank"));
        assert!(aliases.contains("account"));
    }

    #[test]
    fn test_short_token_resolves_unique_owner() {
        // Alias symmetry: typing an alias alone resolves its only owner
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let mentions = resolver.mentions("招商");
        assert_eq!(mentions[0].account.id, 3);
    }

    #[test]
    fn test_cash_hint_prefers_cash_over_bank() {
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let mentions = resolver.mentions("lunch 180 cash");
        assert!(!mentions.is_empty());
        assert_eq!(mentions[0].account.name, "Cash");
    }

    #[test]
    fn test_threshold_boundary() {
        // 11 of the name's 20 distinct chars, scattered so no alias or
        // prefix is contained verbatim, score exactly 11/20 = 0.55
        let config = config();
        let accounts = vec![Account {
            id: 1,
            name: "abcdefghijklmnopqrst".into(),
        }];
        let resolver = AccountResolver::new(&accounts, &config);
        assert_eq!(char_overlap("acegikmoqsb", "abcdefghijklmnopqrst"), 0.55);
        let included = resolver.mentions("acegikmoqsb");
        assert_eq!(included.len(), 1, "score exactly at threshold is included");

        // 10 shared chars score 0.50 and are excluded
        let excluded = resolver.mentions("acegikmoqs");
        assert!(excluded.is_empty(), "score below threshold is excluded");
    }

    #[test]
    fn test_directional_resolution() {
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let resolution = resolver.resolve_transfer("transfer 500 from Cash to Bank Account");
        assert!(resolution.directional);
        assert_eq!(resolution.source.unwrap().name, "Cash");
        assert_eq!(resolution.target.unwrap().name, "Bank Account");
    }

    #[test]
    fn test_directional_resolution_cjk() {
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let resolution = resolver.resolve_transfer("现金转到招商银行 500");
        assert!(resolution.directional);
        assert_eq!(resolution.source.unwrap().id, 1);
        assert_eq!(resolution.target.unwrap().id, 3);
    }

    #[test]
    fn test_transfer_never_resolves_same_account_twice() {
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let resolution = resolver.resolve_transfer("cash to cash 100");
        assert!(!resolution.is_pair());
    }

    #[test]
    fn test_fallback_pair_in_text_order() {
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let resolution = resolver.resolve_transfer("招商银行 cash 500 moved");
        assert!(resolution.is_pair());
        assert!(!resolution.directional);
        assert_eq!(resolution.source.unwrap().id, 3);
        assert_eq!(resolution.target.unwrap().id, 1);
    }

    #[test]
    fn test_single_mention_is_not_a_pair() {
        let accounts = accounts();
        let config = config();
        let resolver = AccountResolver::new(&accounts, &config);
        let resolution = resolver.resolve_transfer("lunch 180 cash");
        assert!(!resolution.is_pair());
    }
}
