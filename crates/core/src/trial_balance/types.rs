//! Trial balance data types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trialcheck_shared::Period;

/// One ledger account for one period, as read from an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceEntry {
    /// Account code (may be empty when the export has none).
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type label from the export, if it carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Debit amount, never negative.
    pub debit: Decimal,
    /// Credit amount, never negative.
    pub credit: Decimal,
}

impl TrialBalanceEntry {
    /// Creates an entry without an explicit account type.
    #[must_use]
    pub fn new(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            account_name: account_name.into(),
            account_type: None,
            debit,
            credit,
        }
    }

    /// Sets the explicit account type label.
    #[must_use]
    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }

    /// Net balance (debit - credit).
    #[must_use]
    pub fn net_balance(&self) -> Decimal {
        self.debit.saturating_sub(self.credit)
    }
}

/// Account category used by the analytical checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Cash and bank accounts.
    Cash,
    /// Accounts receivable.
    Receivable,
    /// Accounts payable and other payables.
    Payable,
    /// Revenue, income, sales.
    Revenue,
    /// Expenses and costs.
    Expense,
    /// Credit card liabilities.
    CreditCard,
    /// Suspense and clearing accounts.
    Suspense,
    /// Anything else.
    Other,
}

impl AccountType {
    /// Returns the snake_case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Receivable => "receivable",
            Self::Payable => "payable",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
            Self::CreditCard => "credit_card",
            Self::Suspense => "suspense",
            Self::Other => "other",
        }
    }

    /// Liabilities expected to carry a credit balance.
    #[must_use]
    pub fn is_credit_liability(&self) -> bool {
        matches!(self, Self::Payable | Self::CreditCard)
    }
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the period close.
    Error,
    /// Advisory only.
    Warning,
}

/// Kind of finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingType {
    /// Total debits differ from total credits beyond tolerance.
    UnbalancedTb,
    /// Liability carrying a debit balance.
    UnusualBalance,
    /// Suspense account with a material balance.
    SuspenseBalance,
    /// Large movement against the previous period.
    UnusualVariance,
    /// Expenses recorded without any revenue.
    MissingRevenue,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Error or warning.
    pub severity: Severity,
    /// Finding kind.
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    /// Short title.
    pub title: String,
    /// Human-readable description.
    pub message: String,
    /// Structured supporting data.
    pub details: BTreeMap<String, Value>,
    /// Suggested action.
    pub recommendation: String,
}

/// Totals over the whole trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Sum of all debits.
    pub total_debits: Decimal,
    /// Sum of all credits.
    pub total_credits: Decimal,
    /// Absolute difference between debits and credits.
    pub difference: Decimal,
    /// Number of entries validated.
    pub total_accounts: usize,
    /// Net credit balance of revenue accounts.
    pub total_revenue: Decimal,
    /// Net debit balance of expense accounts.
    pub total_expenses: Decimal,
}

/// Outcome of validating one trial balance for one company and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Company the trial balance belongs to.
    pub company_id: String,
    /// Period validated.
    pub period: Period,
    /// Period used for variance analysis, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_period: Option<Period>,
    /// Whether debits equal credits within tolerance.
    pub is_balanced: bool,
    /// Findings that block closing.
    pub structural_errors: Vec<Finding>,
    /// Advisory findings.
    pub analytical_warnings: Vec<Finding>,
    /// Totals.
    pub summary: ValidationSummary,
    /// True when there are no structural errors.
    pub can_close: bool,
    /// Parsed entries the result was computed from.
    pub entries: Vec<TrialBalanceEntry>,
}

/// Input to a validation run.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    /// Company identifier.
    pub company_id: String,
    /// Period being validated.
    pub period: Period,
    /// Previous period, if variance analysis was requested.
    pub previous_period: Option<Period>,
    /// Parsed entries.
    pub entries: Vec<TrialBalanceEntry>,
}
