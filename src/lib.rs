pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod report;
pub mod store;

pub use config::Config;
pub use domain::{Action, Decimal, RowId, Scrip, Term, Transaction};
pub use engine::{
    process_transactions, process_transactions_as_of, CapitalGainsReport, EngineError,
    OpenPosition, RealizedLot,
};
pub use error::AppError;
pub use ingest::{read_transactions, ValidationReport};
pub use report::TableKind;
pub use store::{ResultStore, StoredReport};
