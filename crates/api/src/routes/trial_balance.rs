//! Trial balance routes.
//!
//! - `POST /trial-balance/upload` validates an uploaded export and stores the result
//! - `GET /trial-balance/get` returns a stored result
//!
//! An unbalanced ledger is a successful response with `canClose: false`. Error
//! statuses are reserved for bad input (400), missing results (404) and
//! parser or storage failures (500).

use axum::{
    Router,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use trialcheck_core::trial_balance::UploadInput;
use trialcheck_shared::{AppError, AppResult, Period};

use crate::{AppState, error::ApiError};

/// Creates the trial balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trial-balance/upload", post(upload_trial_balance))
        .route("/trial-balance/get", get(get_trial_balance))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for fetching a stored result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTrialBalanceQuery {
    /// Company identifier.
    pub company_id: Option<String>,
    /// Period, `YYYY-MM`.
    pub period: Option<String>,
}

/// Fields collected from the upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    company_id: Option<String>,
    period: Option<String>,
    previous_period: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
    };

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let content = field.bytes().await.map_err(invalid)?;
                form.file = Some((filename, content.to_vec()));
            }
            "companyId" => form.company_id = Some(field.text().await.map_err(invalid)?),
            "period" => form.period = Some(field.text().await.map_err(invalid)?),
            "previousPeriod" => form.previous_period = Some(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }
    Ok(form)
}

/// Returns the trimmed value, or a validation error if it is missing or blank.
fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn parse_period(value: &str, field: &str) -> AppResult<Period> {
    value
        .parse()
        .map_err(|e| AppError::Validation(format!("{field}: {e}")))
}

fn json_document(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        bytes,
    )
        .into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/trial-balance/upload`
/// Validate an uploaded trial balance and store the result.
async fn upload_trial_balance(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let form = read_form(multipart).await?;

    let (filename, content) = form
        .file
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let company_id = required(form.company_id, "companyId")?;
    let period = parse_period(&required(form.period, "period")?, "period")?;
    let previous_period = form
        .previous_period
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(|p| parse_period(&p, "previousPeriod"))
        .transpose()?;

    let stored = state
        .trial_balance
        .upload(UploadInput {
            company_id,
            period,
            previous_period,
            filename,
            content,
        })
        .await?;

    Ok(json_document(stored.json))
}

/// GET `/trial-balance/get?companyId=&period=`
/// Return the stored result for a company and period.
async fn get_trial_balance(
    State(state): State<AppState>,
    Query(query): Query<GetTrialBalanceQuery>,
) -> Result<Response, ApiError> {
    let company_id = required(query.company_id, "companyId")?;
    let period = parse_period(&required(query.period, "period")?, "period")?;

    let document = state
        .trial_balance
        .get(&company_id, period)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no trial balance for company {company_id} and period {period}"
            ))
        })?;

    Ok(json_document(document))
}
