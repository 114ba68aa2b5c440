//! Ingest of uploaded transaction sheets.
//!
//! Turns a CSV upload into the canonical [`Transaction`] table the engine
//! consumes: header aliases are resolved, values coerced and rows validated.
//! Problems are reported through a [`ValidationReport`] rather than failing
//! fast, so a user sees every issue in one pass.

use crate::domain::Transaction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mapping;
pub mod reader;

pub use reader::read_transactions;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("csv parse error: {0}")]
    Csv(String),
}

/// Errors block processing; warnings are informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_ok(&self) -> bool {
        !self.has_errors()
    }

    /// A report carrying a single error.
    pub fn from_error(msg: impl Into<String>) -> Self {
        ValidationReport {
            errors: vec![msg.into()],
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Empty whenever `report` has errors.
    pub transactions: Vec<Transaction>,
    pub report: ValidationReport,
}

impl IngestOutcome {
    fn rejected(report: ValidationReport) -> Self {
        IngestOutcome {
            transactions: Vec::new(),
            report,
        }
    }
}
