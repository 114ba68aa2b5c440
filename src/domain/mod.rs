//! Domain types and determinism layer for the capital gains engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Scrip, RowId, Action, Term
//! - The canonical Transaction row
//! - Stable (trade_date, source_row_id) ordering for deterministic matching

pub mod decimal;
pub mod ordering;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use ordering::TradeOrderingKey;
pub use primitives::{Action, RowId, Scrip, Term};
pub use transaction::Transaction;
