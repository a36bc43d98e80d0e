//! Account-type inference from account names.
//!
//! Categories are tried in a fixed priority order and the first match wins.
//! Names often hit several categories ("Accrued Expense Payable",
//! "Accounts Payable Clearing"), so the order below decides the outcome and
//! must not be rearranged.

use super::types::{AccountType, TrialBalanceEntry};

/// Keyword rules in priority order.
///
/// Keywords of two characters or fewer (`ar`, `ap`) only match whole words;
/// longer keywords match anywhere in the name.
const RULES: &[(AccountType, &[&str])] = &[
    (AccountType::Cash, &["cash", "bank"]),
    (AccountType::Receivable, &["receivable", "ar"]),
    (AccountType::Payable, &["payable", "ap"]),
    (AccountType::Revenue, &["revenue", "income", "sales"]),
    (AccountType::Expense, &["expense", "cost"]),
    (AccountType::CreditCard, &["credit card", "cc payable"]),
    (
        AccountType::Suspense,
        &["suspense", "miscellaneous", "clearing"],
    ),
];

/// Infers an account type from a free-text label.
#[must_use]
pub fn classify_name(name: &str) -> AccountType {
    let normalized = normalize(name);
    let padded = format!(" {normalized} ");

    RULES
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|keyword| {
                if keyword.len() <= 2 {
                    padded.contains(&format!(" {keyword} "))
                } else {
                    normalized.contains(keyword)
                }
            })
        })
        .map_or(AccountType::Other, |(account_type, _)| *account_type)
}

/// Resolves the account type for an entry.
///
/// An explicit type label goes through the same keyword rules, and a label
/// that matches nothing is `Other`. The account name is only used when no
/// label was given.
#[must_use]
pub fn classify_entry(entry: &TrialBalanceEntry) -> AccountType {
    match entry.account_type.as_deref() {
        Some(label) => classify_name(label),
        None => classify_name(&entry.account_name),
    }
}

/// Lowercases and collapses punctuation to single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
