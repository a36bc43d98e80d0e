//! Trial balance validation rules.
//!
//! One structural check (debits equal credits) decides whether a period can
//! close. The analytical passes only add warnings. Warnings are emitted pass by
//! pass in a fixed order, and in entry order within each pass.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use super::classify::classify_entry;
use super::types::{
    AccountType, Finding, FindingType, Severity, TrialBalanceEntry, ValidationRequest,
    ValidationResult, ValidationSummary,
};

/// Largest debit/credit difference still treated as balanced.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.01);
/// Suspense balances above this absolute amount are flagged.
pub const SUSPENSE_THRESHOLD: Decimal = dec!(1000);
/// Cash movements above this percentage are flagged.
pub const CASH_VARIANCE_PERCENT: Decimal = dec!(70);
/// Expense movements must exceed this percentage...
pub const EXPENSE_VARIANCE_PERCENT: Decimal = dec!(150);
/// ...and this absolute amount to be flagged.
pub const EXPENSE_VARIANCE_AMOUNT: Decimal = dec!(5000);

/// Validates parsed trial balances.
pub struct TrialBalanceValidator;

impl TrialBalanceValidator {
    /// Runs every check over the request and assembles the result.
    ///
    /// `previous` is the stored result for the previous period, if any. It is
    /// only read.
    #[must_use]
    pub fn validate(
        request: ValidationRequest,
        previous: Option<&ValidationResult>,
    ) -> ValidationResult {
        let ValidationRequest {
            company_id,
            period,
            previous_period,
            entries,
        } = request;

        let classified: Vec<(&TrialBalanceEntry, AccountType)> = entries
            .iter()
            .map(|entry| (entry, classify_entry(entry)))
            .collect();

        let summary = Self::summarize(&classified);
        let is_balanced = summary.difference <= BALANCE_TOLERANCE;

        let mut structural_errors = Vec::new();
        if !is_balanced {
            structural_errors.push(unbalanced_finding(&summary));
        }

        let mut analytical_warnings = Vec::new();
        analytical_warnings.extend(unusual_balances(&classified));
        analytical_warnings.extend(suspense_balances(&classified));
        if let Some(previous) = previous {
            analytical_warnings.extend(period_variances(&classified, previous));
        }
        analytical_warnings.extend(missing_revenue(&summary));

        let can_close = structural_errors.is_empty();

        ValidationResult {
            company_id,
            period,
            previous_period,
            is_balanced,
            structural_errors,
            analytical_warnings,
            summary,
            can_close,
            entries,
        }
    }

    /// Computes totals over classified entries.
    fn summarize(classified: &[(&TrialBalanceEntry, AccountType)]) -> ValidationSummary {
        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;
        let mut total_revenue = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        // Saturating so oversized input yields an unbalanced result, not a panic.
        for (entry, account_type) in classified {
            total_debits = total_debits.saturating_add(entry.debit);
            total_credits = total_credits.saturating_add(entry.credit);
            match account_type {
                AccountType::Revenue => {
                    total_revenue = total_revenue.saturating_sub(entry.net_balance());
                }
                AccountType::Expense => {
                    total_expenses = total_expenses.saturating_add(entry.net_balance());
                }
                _ => {}
            }
        }

        ValidationSummary {
            total_debits,
            total_credits,
            difference: total_debits.saturating_sub(total_credits).abs(),
            total_accounts: classified.len(),
            total_revenue,
            total_expenses,
        }
    }
}

/// Percentage change from `previous` to `current`, relative to `|previous|`.
///
/// Returns zero when the previous balance is zero.
#[must_use]
pub fn percent_change(previous: Decimal, current: Decimal) -> Decimal {
    current
        .saturating_sub(previous)
        .checked_div(previous.abs())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

fn unbalanced_finding(summary: &ValidationSummary) -> Finding {
    Finding {
        severity: Severity::Error,
        finding_type: FindingType::UnbalancedTb,
        title: "Trial balance does not balance".to_string(),
        message: format!(
            "Total debits ({}) do not equal total credits ({}). Difference: {}.",
            summary.total_debits, summary.total_credits, summary.difference
        ),
        details: details([
            ("totalDebits", amount(summary.total_debits)),
            ("totalCredits", amount(summary.total_credits)),
            ("difference", amount(summary.difference)),
        ]),
        recommendation: "Locate the missing or duplicated posting and re-export the trial balance \
                         before closing the period."
            .to_string(),
    }
}

fn unusual_balances(classified: &[(&TrialBalanceEntry, AccountType)]) -> Vec<Finding> {
    classified
        .iter()
        .filter(|(entry, account_type)| {
            account_type.is_credit_liability() && entry.net_balance() > Decimal::ZERO
        })
        .map(|(entry, account_type)| Finding {
            severity: Severity::Warning,
            finding_type: FindingType::UnusualBalance,
            title: "Unusual debit balance".to_string(),
            message: format!(
                "{} is a {} account but carries a debit balance of {}.",
                entry.account_name,
                account_type.as_str(),
                entry.net_balance()
            ),
            details: details([
                ("accountCode", Value::from(entry.account_code.as_str())),
                ("accountName", Value::from(entry.account_name.as_str())),
                ("accountType", Value::from(account_type.as_str())),
                ("balance", amount(entry.net_balance())),
            ]),
            recommendation: "Check for overpayments, duplicate payments or entries posted to \
                             the wrong side."
                .to_string(),
        })
        .collect()
}

fn suspense_balances(classified: &[(&TrialBalanceEntry, AccountType)]) -> Vec<Finding> {
    classified
        .iter()
        .filter(|(entry, account_type)| {
            *account_type == AccountType::Suspense
                && entry.net_balance().abs() > SUSPENSE_THRESHOLD
        })
        .map(|(entry, _)| Finding {
            severity: Severity::Warning,
            finding_type: FindingType::SuspenseBalance,
            title: "Suspense account not cleared".to_string(),
            message: format!(
                "{} holds a balance of {}.",
                entry.account_name,
                entry.net_balance().abs()
            ),
            details: details([
                ("accountCode", Value::from(entry.account_code.as_str())),
                ("accountName", Value::from(entry.account_name.as_str())),
                ("balance", amount(entry.net_balance())),
                ("threshold", amount(SUSPENSE_THRESHOLD)),
            ]),
            recommendation: "Reclassify the items held in this account to their proper accounts."
                .to_string(),
        })
        .collect()
}

fn period_variances(
    classified: &[(&TrialBalanceEntry, AccountType)],
    previous: &ValidationResult,
) -> Vec<Finding> {
    let mut previous_net: HashMap<&str, Decimal> = HashMap::new();
    for entry in &previous.entries {
        previous_net
            .entry(entry.account_name.as_str())
            .or_insert_with(|| entry.net_balance());
    }

    classified
        .iter()
        .filter_map(|(entry, account_type)| {
            let previous_balance = *previous_net.get(entry.account_name.as_str())?;
            let current_balance = entry.net_balance();
            let change = current_balance.saturating_sub(previous_balance);
            let percent = percent_change(previous_balance, current_balance);

            let recommendation = match account_type {
                AccountType::Cash if percent.abs() > CASH_VARIANCE_PERCENT => {
                    "Confirm the movement against bank statements and the bank reconciliation."
                }
                AccountType::Expense
                    if percent.abs() > EXPENSE_VARIANCE_PERCENT
                        && change.abs() > EXPENSE_VARIANCE_AMOUNT =>
                {
                    "Review the account for misclassified, duplicated or one-off charges."
                }
                _ => return None,
            };

            Some(Finding {
                severity: Severity::Warning,
                finding_type: FindingType::UnusualVariance,
                title: "Unusual period-over-period variance".to_string(),
                message: format!(
                    "{} moved by {} ({}%) since {}.",
                    entry.account_name,
                    change,
                    percent.round_dp(2).normalize(),
                    previous.period
                ),
                details: details([
                    ("accountCode", Value::from(entry.account_code.as_str())),
                    ("accountName", Value::from(entry.account_name.as_str())),
                    ("accountType", Value::from(account_type.as_str())),
                    ("previousBalance", amount(previous_balance)),
                    ("currentBalance", amount(current_balance)),
                    ("change", amount(change)),
                    ("percentChange", amount(percent.round_dp(2))),
                ]),
                recommendation: recommendation.to_string(),
            })
        })
        .collect()
}

fn missing_revenue(summary: &ValidationSummary) -> Option<Finding> {
    if !summary.total_revenue.is_zero() || summary.total_expenses <= Decimal::ZERO {
        return None;
    }

    Some(Finding {
        severity: Severity::Warning,
        finding_type: FindingType::MissingRevenue,
        title: "No revenue recorded".to_string(),
        message: format!(
            "Expenses of {} were recorded but revenue is zero.",
            summary.total_expenses
        ),
        details: details([
            ("totalRevenue", amount(summary.total_revenue)),
            ("totalExpenses", amount(summary.total_expenses)),
        ]),
        recommendation: "Confirm that sales for the period have been invoiced and posted."
            .to_string(),
    })
}

fn details<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn amount(value: Decimal) -> Value {
    Value::String(value.normalize().to_string())
}
