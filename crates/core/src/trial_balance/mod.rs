//! Trial balance validation.
//!
//! Checks an uploaded trial balance for debit/credit balance (the only
//! structural error, which blocks closing the period) and runs analytical
//! passes that flag suspicious accounts for review.

pub mod classify;
pub mod error;
pub mod service;
pub mod types;
pub mod validator;


pub use classify::{classify_entry, classify_name};
pub use error::TrialBalanceError;
pub use service::{
    StoredResult, TrialBalanceService, UploadInput, company_key_segment, result_key,
};
pub use types::{
    AccountType, Finding, FindingType, Severity, TrialBalanceEntry, ValidationRequest,
    ValidationResult, ValidationSummary,
};
pub use validator::{
    BALANCE_TOLERANCE, CASH_VARIANCE_PERCENT, EXPENSE_VARIANCE_AMOUNT, EXPENSE_VARIANCE_PERCENT,
    SUSPENSE_THRESHOLD, TrialBalanceValidator, percent_change,
};
