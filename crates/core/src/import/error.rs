//! Ledger import error types.

use thiserror::Error;

/// Errors raised while reading an uploaded ledger export.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file extension is not a supported format.
    #[error("unsupported file type '{extension}': expected csv, tsv, txt, xlsx, xlsm, xlsb, xls or ods")]
    UnsupportedFormat {
        /// Extension as supplied (may be empty).
        extension: String,
    },

    /// The file could not be decoded.
    #[error("failed to read ledger file: {0}")]
    Malformed(String),
}

impl ImportError {
    /// Create an unsupported format error.
    #[must_use]
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create a malformed file error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
