use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::engine::{process_transactions, CapitalGainsReport};
use crate::error::AppError;
use crate::ingest::{read_transactions, ValidationReport};

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub ok: bool,
    pub token: String,
    pub fingerprint: String,
    pub validations: ValidationReport,
    #[serde(flatten)]
    pub report: CapitalGainsReport,
}

struct Processed {
    report: CapitalGainsReport,
    validations: ValidationReport,
    fingerprint: String,
}

/// Parse, validate and match one uploaded batch.
fn run_batch(body: &[u8]) -> Result<Processed, AppError> {
    let outcome = read_transactions(body)?;
    if outcome.report.has_errors() {
        return Err(AppError::Validation(outcome.report));
    }

    let report = process_transactions(&outcome.transactions)?;
    let fingerprint = report.fingerprint()?;
    Ok(Processed {
        report,
        validations: outcome.report,
        fingerprint,
    })
}

pub async fn process_upload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProcessResponse>, AppError> {
    let processed = tokio::task::spawn_blocking(move || run_batch(&body))
        .await
        .map_err(|e| AppError::Internal(format!("processing task failed: {}", e)))??;

    let token = state
        .results
        .insert(processed.report.clone(), processed.fingerprint.clone());
    tracing::info!(
        token = %token,
        realized_lots = processed.report.realized_lots.len(),
        open_positions = processed.report.open_positions.len(),
        warnings = processed.validations.warnings.len(),
        "batch processed"
    );

    Ok(Json(ProcessResponse {
        ok: true,
        token,
        fingerprint: processed.fingerprint,
        validations: processed.validations,
        report: processed.report,
    }))
}
