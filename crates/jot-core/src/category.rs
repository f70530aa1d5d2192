//! Category inference
//!
//! A verbatim category-name hit always wins. Otherwise ordered keyword
//! groups map text evidence to a candidate category whose name matches the
//! group's pattern. Transfers bypass this module entirely (the caller maps
//! them to the fixed transfer category).

use regex::Regex;

use crate::models::{Category, TransactionKind};
use crate::normalize::normalize;

/// One keyword group: text evidence on the left, a category-name pattern on
/// the right
struct KeywordGroup {
    text_keywords: &'static [&'static str],
    name_pattern: &'static str,
}

/// Income groups, tested in order: salary-like, bonus-like, investment-like
const INCOME_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        text_keywords: &[
            "salary", "wage", "payroll", "paycheck", "工资", "薪水", "薪资", "月薪",
        ],
        name_pattern: "(?i)salary|wage|payroll|工资|薪",
    },
    KeywordGroup {
        text_keywords: &["bonus", "award", "奖金", "年终奖", "红包"],
        name_pattern: "(?i)bonus|award|奖",
    },
    KeywordGroup {
        text_keywords: &[
            "dividend", "interest", "invest", "stock", "fund", "理财", "股票", "基金", "利息",
            "分红",
        ],
        name_pattern: "(?i)invest|dividend|interest|stock|fund|理财|股|基金|利息",
    },
];

/// Expense groups, tested in order: food, transport, daily goods, housing,
/// leisure, health
const EXPENSE_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        text_keywords: &[
            "lunch", "dinner", "breakfast", "brunch", "meal", "food", "snack", "coffee",
            "restaurant", "takeout", "早饭", "午饭", "晚饭", "早餐", "午餐", "晚餐", "夜宵",
            "外卖", "奶茶", "咖啡", "聚餐", "吃",
        ],
        name_pattern: "(?i)food|dining|meal|restaurant|grocer|餐|吃|食",
    },
    KeywordGroup {
        text_keywords: &[
            "taxi", "bus", "subway", "metro", "train", "flight", "fuel", "gas", "uber", "didi",
            "打车", "公交", "地铁", "高铁", "火车", "机票", "加油", "油费", "滴滴", "出租",
        ],
        name_pattern: "(?i)transport|transit|travel|taxi|car|交通|出行|车",
    },
    KeywordGroup {
        text_keywords: &[
            "grocery", "groceries", "supermarket", "shampoo", "detergent", "tissue", "超市",
            "日用", "洗发", "纸巾", "牙膏",
        ],
        name_pattern: "(?i)daily|grocer|household|necessit|shopping|日用|超市|购物",
    },
    KeywordGroup {
        text_keywords: &[
            "rent", "mortgage", "utilities", "electricity", "water bill", "internet", "房租",
            "房贷", "水费", "电费", "燃气", "物业", "宽带",
        ],
        name_pattern: "(?i)hous|rent|home|utilit|房|住|水电",
    },
    KeywordGroup {
        text_keywords: &[
            "movie", "cinema", "game", "concert", "ktv", "trip", "vacation", "电影", "游戏",
            "演唱会", "旅游", "门票",
        ],
        name_pattern: "(?i)entertain|leisure|movie|game|fun|娱乐|电影|玩|旅",
    },
    KeywordGroup {
        text_keywords: &[
            "hospital", "doctor", "medicine", "pharmacy", "clinic", "dentist", "医院", "看病",
            "买药", "药店", "体检", "牙医",
        ],
        name_pattern: "(?i)health|medic|hospital|pharma|医|药|健康",
    },
];

/// True when the category is usable for the given kind
fn usable_for(category: &Category, kind: TransactionKind) -> bool {
    category.kind.is_none() || category.kind == Some(kind)
}

/// Walk a group table: the first group whose text evidence fires and whose
/// name pattern matches a candidate wins
fn match_groups<'a>(
    text: &str,
    candidates: &[&'a Category],
    groups: &[KeywordGroup],
) -> Option<&'a Category> {
    for group in groups {
        if !group.text_keywords.iter().any(|kw| text.contains(kw)) {
            continue;
        }
        let pattern = Regex::new(group.name_pattern).expect("valid regex");
        if let Some(category) = candidates.iter().find(|c| pattern.is_match(&c.name)).copied() {
            return Some(category);
        }
    }
    None
}

/// Infer a category name from normalized text for an income or expense entry
///
/// Returns `None` when nothing matches; the caller applies its own "other"
/// default. Transfer entries never reach this function.
pub fn infer_category(
    text: &str,
    categories: &[Category],
    kind: TransactionKind,
) -> Option<String> {
    let candidates: Vec<&Category> = categories.iter().filter(|c| usable_for(c, kind)).collect();

    // Direct match has highest priority
    for category in &candidates {
        let name = normalize(&category.name);
        if !name.is_empty() && text.contains(&name) {
            return Some(category.name.clone());
        }
    }

    match kind {
        TransactionKind::Income => match_groups(text, &candidates, INCOME_GROUPS)
            .or_else(|| {
                // Default: the first category actually tagged income
                candidates
                    .iter()
                    .find(|c| c.kind == Some(TransactionKind::Income))
                    .copied()
            })
            .map(|c| c.name.clone()),
        TransactionKind::Expense => {
            match_groups(text, &candidates, EXPENSE_GROUPS).map(|c| c.name.clone())
        }
        TransactionKind::Transfer => None,
    }
}

/// True when the text carries strong keyword evidence for the given kind,
/// regardless of which category it would resolve to
pub fn has_category_evidence(text: &str, kind: TransactionKind) -> bool {
    let groups = match kind {
        TransactionKind::Income => INCOME_GROUPS,
        TransactionKind::Expense => EXPENSE_GROUPS,
        TransactionKind::Transfer => return false,
    };
    groups
        .iter()
        .any(|g| g.text_keywords.iter().any(|kw| text.contains(kw)))
}

/// The fixed category name for transfers: the first transfer-tagged
/// candidate, else the configured default
pub fn transfer_category(categories: &[Category], default_name: &str) -> String {
    categories
        .iter()
        .find(|c| c.kind == Some(TransactionKind::Transfer))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| default_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                name: "Food & Dining".into(),
                kind: Some(TransactionKind::Expense),
            },
            Category {
                name: "Transport".into(),
                kind: Some(TransactionKind::Expense),
            },
            Category {
                name: "Salary".into(),
                kind: Some(TransactionKind::Income),
            },
            Category {
                name: "Investment Income".into(),
                kind: Some(TransactionKind::Income),
            },
            Category {
                name: "Account Transfer".into(),
                kind: Some(TransactionKind::Transfer),
            },
            Category {
                name: "Gifts".into(),
                kind: None,
            },
        ]
    }

    #[test]
    fn test_direct_name_match_wins() {
        let cats = categories();
        let result = infer_category("gifts for mom 200", &cats, TransactionKind::Expense);
        assert_eq!(result.as_deref(), Some("Gifts"));
    }

    #[test]
    fn test_food_keyword_group() {
        let cats = categories();
        let result = infer_category("lunch 180 cash", &cats, TransactionKind::Expense);
        assert_eq!(result.as_deref(), Some("Food & Dining"));
    }

    #[test]
    fn test_transport_keyword_group_cjk() {
        let cats = categories();
        let result = infer_category("打车 23", &cats, TransactionKind::Expense);
        assert_eq!(result.as_deref(), Some("Transport"));
    }

    #[test]
    fn test_salary_group_resolves_via_keywords_not_substring() {
        let cats = categories();
        // "salary 50000" hits the salary keyword group; the category name
        // itself is matched by the group pattern, not contained in the text
        let result = infer_category("payroll 50000", &cats, TransactionKind::Income);
        assert_eq!(result.as_deref(), Some("Salary"));
    }

    #[test]
    fn test_income_defaults_to_first_income_category() {
        let cats = categories();
        let result = infer_category("misc money in 300", &cats, TransactionKind::Income);
        assert_eq!(result.as_deref(), Some("Salary"));
    }

    #[test]
    fn test_expense_without_group_match_is_absent() {
        let cats = categories();
        let result = infer_category("misc 42", &cats, TransactionKind::Expense);
        assert_eq!(result, None);
    }

    #[test]
    fn test_kind_filter_excludes_wrong_candidates() {
        let cats = categories();
        // The salary group can't return an expense-tagged category
        let result = infer_category("salary snacks", &cats, TransactionKind::Income);
        assert_eq!(result.as_deref(), Some("Salary"));
    }

    #[test]
    fn test_transfer_category_prefers_tagged_candidate() {
        let cats = categories();
        assert_eq!(transfer_category(&cats, "Transfer"), "Account Transfer");
        assert_eq!(transfer_category(&[], "Transfer"), "Transfer");
    }
}
