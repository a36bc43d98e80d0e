//! Upload and lookup of trial balance validation results.

use std::sync::Arc;

use tracing::{debug, info, warn};
use trialcheck_shared::Period;

use super::error::TrialBalanceError;
use super::types::{ValidationRequest, ValidationResult};
use super::validator::TrialBalanceValidator;
use crate::import::parse_ledger;
use crate::storage::KeyValueStore;

/// Storage key for the result of one company and period.
#[must_use]
pub fn result_key(company_id: &str, period: Period) -> String {
    format!("trial-balance:{company_id}:{period}")
}

/// Checks a company id before it becomes part of a storage key.
///
/// Returns the trimmed id. Ids that could escape or restructure the key space
/// of a path-based store are rejected.
///
/// # Errors
///
/// Returns `MissingField` for a blank id and `InvalidField` for an id holding
/// a separator, `..` or a control character.
pub fn company_key_segment(company_id: &str) -> Result<&str, TrialBalanceError> {
    let company_id = company_id.trim();
    if company_id.is_empty() {
        return Err(TrialBalanceError::MissingField("companyId"));
    }

    let invalid = |reason| TrialBalanceError::InvalidField {
        field: "companyId",
        reason,
    };
    if company_id.contains(['/', '\\', ':']) {
        return Err(invalid("must not contain '/', '\\' or ':'"));
    }
    if company_id.contains("..") {
        return Err(invalid("must not contain '..'"));
    }
    if company_id.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    Ok(company_id)
}

/// An uploaded trial balance export.
#[derive(Debug, Clone)]
pub struct UploadInput {
    /// Company identifier.
    pub company_id: String,
    /// Period the export covers.
    pub period: Period,
    /// Period to compare against, if any.
    pub previous_period: Option<Period>,
    /// Original filename, used to pick the parser.
    pub filename: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// A validation result together with the exact JSON document persisted.
#[derive(Debug, Clone)]
pub struct StoredResult {
    /// Validation result.
    pub result: ValidationResult,
    /// Serialized form, byte-identical to what the store holds.
    pub json: Vec<u8>,
}

/// Validates uploads and persists results in an injected key-value store.
pub struct TrialBalanceService<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> TrialBalanceService<S> {
    /// Create a new trial balance service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Parses, validates and persists an upload.
    ///
    /// The result is stored under `trial-balance:{companyId}:{period}`,
    /// replacing any earlier result. Nothing is written when parsing fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `company_id` is blank or unsafe as a key segment
    /// - The file type is unsupported or the file cannot be decoded
    /// - The store fails
    pub async fn upload(&self, input: UploadInput) -> Result<StoredResult, TrialBalanceError> {
        let company_id = company_key_segment(&input.company_id)?;

        let entries = parse_ledger(&input.content, &input.filename)?;
        debug!(
            company_id = %company_id,
            period = %input.period,
            filename = %input.filename,
            entries = entries.len(),
            "Parsed trial balance"
        );

        let previous = match input.previous_period {
            Some(previous_period) => self.load_previous(company_id, previous_period).await?,
            None => None,
        };

        let result = TrialBalanceValidator::validate(
            ValidationRequest {
                company_id: company_id.to_string(),
                period: input.period,
                previous_period: input.previous_period,
                entries,
            },
            previous.as_ref(),
        );

        let json = serde_json::to_vec(&result)?;
        self.store
            .set(&result_key(company_id, input.period), json.clone())
            .await?;

        info!(
            company_id = %company_id,
            period = %input.period,
            is_balanced = result.is_balanced,
            can_close = result.can_close,
            warnings = result.analytical_warnings.len(),
            "Trial balance validated"
        );

        Ok(StoredResult { result, json })
    }

    /// Returns the stored JSON document for a company and period.
    ///
    /// # Errors
    ///
    /// Returns an error if `company_id` is blank or unsafe as a key segment,
    /// or the store fails.
    pub async fn get(
        &self,
        company_id: &str,
        period: Period,
    ) -> Result<Option<Vec<u8>>, TrialBalanceError> {
        let company_id = company_key_segment(company_id)?;
        Ok(self.store.get(&result_key(company_id, period)).await?)
    }

    /// Loads the previous period's result for variance analysis.
    ///
    /// A missing or undecodable document means no comparison is made.
    async fn load_previous(
        &self,
        company_id: &str,
        period: Period,
    ) -> Result<Option<ValidationResult>, TrialBalanceError> {
        let Some(bytes) = self.store.get(&result_key(company_id, period)).await? else {
            debug!(company_id = %company_id, period = %period, "No previous period result");
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(previous) => Ok(Some(previous)),
            Err(e) => {
                warn!(
                    company_id = %company_id,
                    period = %period,
                    error = %e,
                    "Ignoring unreadable previous period result"
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportError;
    use crate::storage::{OperatorStore, StorageProvider};
    use rstest::rstest;
    use crate::trial_balance::FindingType;

    const BALANCED: &str = "Code,Account Name,Debit,Credit\n\
                            1000,Operating Bank,1000,\n\
                            4000,Sales,,1000\n";

    fn service() -> (Arc<OperatorStore>, TrialBalanceService<OperatorStore>) {
        let store = Arc::new(OperatorStore::memory().expect("memory store"));
        (store.clone(), TrialBalanceService::new(store))
    }

    fn input(period: &str, previous: Option<&str>, filename: &str, body: &str) -> UploadInput {
        UploadInput {
            company_id: "acme".to_string(),
            period: period.parse().expect("valid period"),
            previous_period: previous.map(|p| p.parse().expect("valid period")),
            filename: filename.to_string(),
            content: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_result_key() {
        let period: Period = "2024-01".parse().expect("valid period");
        assert_eq!(result_key("acme", period), "trial-balance:acme:2024-01");
    }

    #[tokio::test]
    async fn test_upload_persists_exact_json() {
        let (store, service) = service();
        let stored = service
            .upload(input("2024-01", None, "tb.csv", BALANCED))
            .await
            .expect("upload");

        assert!(stored.result.can_close);
        let persisted = store
            .get("trial-balance:acme:2024-01")
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(persisted, stored.json);

        let fetched = service
            .get("acme", "2024-01".parse().expect("valid period"))
            .await
            .expect("get");
        assert_eq!(fetched, Some(stored.json));
    }

    #[tokio::test]
    async fn test_unbalanced_result_is_still_persisted() {
        let (store, service) = service();
        let body = "Code,Name,Debit,Credit\n1000,Cash,100,\n4000,Sales,,90\n";
        let stored = service
            .upload(input("2024-01", None, "tb.csv", body))
            .await
            .expect("upload");

        assert!(!stored.result.can_close);
        assert!(store.get("trial-balance:acme:2024-01").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_rerun_is_deterministic_and_overwrites() {
        let (_, service) = service();
        let first = service
            .upload(input("2024-01", None, "tb.csv", BALANCED))
            .await
            .expect("upload");
        let second = service
            .upload(input("2024-01", None, "tb.csv", BALANCED))
            .await
            .expect("upload");
        assert_eq!(first.json, second.json);

        let changed = "Code,Name,Debit,Credit\n1000,Cash,5,\n";
        let third = service
            .upload(input("2024-01", None, "tb.csv", changed))
            .await
            .expect("upload");
        let fetched = service
            .get("acme", "2024-01".parse().expect("valid period"))
            .await
            .expect("get");
        assert_eq!(fetched, Some(third.json));
    }

    #[tokio::test]
    async fn test_previous_period_drives_variance() {
        let (_, service) = service();
        service
            .upload(input("2024-01", None, "tb.csv", BALANCED))
            .await
            .expect("upload");

        let current = "Code,Account Name,Debit,Credit\n\
                       1000,Operating Bank,1800,\n\
                       4000,Sales,,1800\n";
        let stored = service
            .upload(input("2024-02", Some("2024-01"), "tb.csv", current))
            .await
            .expect("upload");

        let variances: Vec<_> = stored
            .result
            .analytical_warnings
            .iter()
            .filter(|f| f.finding_type == FindingType::UnusualVariance)
            .collect();
        assert_eq!(variances.len(), 1);
        assert_eq!(variances[0].details["accountName"], "Operating Bank");
        assert_eq!(
            stored.result.previous_period.map(|p| p.to_string()).as_deref(),
            Some("2024-01")
        );
    }

    #[tokio::test]
    async fn test_missing_previous_period_is_skipped() {
        let (_, service) = service();
        let stored = service
            .upload(input("2024-02", Some("2023-12"), "tb.csv", BALANCED))
            .await
            .expect("upload");
        assert!(stored.result.analytical_warnings.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_previous_period_is_skipped() {
        let (store, service) = service();
        store
            .set("trial-balance:acme:2024-01", b"not json".to_vec())
            .await
            .expect("set");

        let stored = service
            .upload(input("2024-02", Some("2024-01"), "tb.csv", BALANCED))
            .await
            .expect("upload");
        assert!(stored.result.analytical_warnings.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_writes_nothing() {
        let (store, service) = service();
        let err = service
            .upload(input("2024-01", None, "tb.xlsx", "garbage"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrialBalanceError::Import(ImportError::Malformed(_))
        ));
        assert!(store.get("trial-balance:acme:2024-01").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_format_writes_nothing() {
        let (store, service) = service();
        let err = service
            .upload(input("2024-01", None, "tb.pdf", BALANCED))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrialBalanceError::Import(ImportError::UnsupportedFormat { .. })
        ));
        assert!(store.get("trial-balance:acme:2024-01").await.expect("get").is_none());
    }

    #[rstest]
    #[case("x/../../../tmp/pwn")]
    #[case("acme/eu")]
    #[case("..")]
    #[case("acme..")]
    #[case("C:\\data")]
    #[case("acme:2024-01")]
    #[case("acme\nbeta")]
    #[case("acme\u{0}")]
    fn test_unsafe_company_ids_are_rejected(#[case] company_id: &str) {
        assert!(matches!(
            company_key_segment(company_id),
            Err(TrialBalanceError::InvalidField { field: "companyId", .. })
        ));
    }

    #[rstest]
    #[case("acme", "acme")]
    #[case("  acme-eu_2 ", "acme-eu_2")]
    #[case("Acme Holdings Ltd.", "Acme Holdings Ltd.")]
    fn test_safe_company_ids_are_trimmed(#[case] company_id: &str, #[case] expected: &str) {
        assert_eq!(company_key_segment(company_id).expect("valid id"), expected);
    }

    #[tokio::test]
    async fn test_traversing_company_id_writes_nothing() {
        let root = std::env::temp_dir().join(format!("trialcheck-keys-{}", std::process::id()));
        let store = Arc::new(
            OperatorStore::from_provider(&StorageProvider::LocalFs { root: root.join("data") })
                .expect("fs store"),
        );
        let service = TrialBalanceService::new(store);

        let mut upload = input("2024-01", None, "tb.csv", BALANCED);
        upload.company_id = "x/../../escaped".to_string();
        let err = service.upload(upload).await.unwrap_err();
        assert!(matches!(err, TrialBalanceError::InvalidField { .. }));
        assert!(!root.join("escaped:2024-01").exists());

        let err = service
            .get("x/../../escaped", "2024-01".parse().expect("valid period"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrialBalanceError::InvalidField { .. }));

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_blank_company_is_rejected() {
        let (store, service) = service();
        let mut upload = input("2024-01", None, "tb.csv", BALANCED);
        upload.company_id = "  ".to_string();

        let err = service.upload(upload).await.unwrap_err();
        assert!(matches!(err, TrialBalanceError::MissingField("companyId")));
        assert!(store.get("trial-balance::2024-01").await.expect("get").is_none());
    }
}
