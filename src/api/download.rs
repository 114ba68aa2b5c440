use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::AppState;
use crate::error::AppError;
use crate::report::TableKind;

pub async fn download_table(
    Path((token, table)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let kind: TableKind = table.parse().map_err(AppError::BadRequest)?;
    let stored = state
        .results
        .get(&token)
        .ok_or_else(|| AppError::NotFound("Token not found or expired".to_string()))?;

    let body = stored.report.table_csv(kind)?;
    let etag = format!("\"{}\"", stored.fingerprint);
    let disposition = format!("attachment; filename={}_{}.csv", kind, token);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::ETAG, etag),
        ],
        body,
    )
        .into_response())
}
