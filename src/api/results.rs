use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::engine::CapitalGainsReport;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub ok: bool,
    pub token: String,
    pub fingerprint: String,
    #[serde(flatten)]
    pub report: CapitalGainsReport,
}

pub async fn get_results(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResultsResponse>, AppError> {
    let stored = state
        .results
        .get(&token)
        .ok_or_else(|| AppError::NotFound("Token not found or expired".to_string()))?;

    Ok(Json(ResultsResponse {
        ok: true,
        token,
        fingerprint: stored.fingerprint.clone(),
        report: stored.report.clone(),
    }))
}
