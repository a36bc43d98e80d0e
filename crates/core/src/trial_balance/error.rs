//! Trial balance service error types.

use thiserror::Error;
use trialcheck_shared::AppError;

use crate::import::ImportError;
use crate::storage::StorageError;

/// Errors that stop an upload or lookup.
///
/// An unbalanced ledger is not an error; it is reported in the result.
#[derive(Debug, Error)]
pub enum TrialBalanceError {
    /// A required input was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field held a value that cannot be used.
    #[error("{field} is invalid: {reason}")]
    InvalidField {
        /// Request field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The uploaded file could not be imported.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The key-value store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The result could not be encoded.
    #[error("failed to encode validation result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TrialBalanceError> for AppError {
    fn from(err: TrialBalanceError) -> Self {
        match err {
            TrialBalanceError::MissingField(_)
            | TrialBalanceError::InvalidField { .. }
            | TrialBalanceError::Import(ImportError::UnsupportedFormat { .. }) => {
                Self::Validation(err.to_string())
            }
            TrialBalanceError::Import(ImportError::Malformed(_)) => Self::Parse(err.to_string()),
            TrialBalanceError::Storage(_) => Self::Storage(err.to_string()),
            TrialBalanceError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}
