//! CSV export and content fingerprinting.

use super::{Table, TableKind};
use crate::engine::CapitalGainsReport;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv write error: {0}")]
    Csv(String),
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Csv(err.to_string())
    }
}

/// Render rows as CSV. The header row is always written.
pub fn to_csv_bytes<T: Table>(rows: &[T]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))
}

pub(super) fn fingerprint(report: &CapitalGainsReport) -> Result<String, ReportError> {
    let mut hasher = Sha256::new();
    for kind in TableKind::ALL {
        hasher.update(kind.as_str());
        hasher.update([0u8]);
        hasher.update(report.table_csv(kind)?);
        hasher.update([0u8]);
    }
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}
