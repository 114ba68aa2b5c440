//! Stable transaction ordering for deterministic lot matching.

use crate::domain::{RowId, Transaction};
use chrono::NaiveDate;

/// Ordering key for rows of one scrip.
///
/// Ordering: trade_date -> source_row_id. Row ids are unique within a batch,
/// so the key is a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey {
    pub trade_date: NaiveDate,
    pub source_row_id: RowId,
}

impl TradeOrderingKey {
    pub fn new(trade_date: NaiveDate, source_row_id: RowId) -> Self {
        TradeOrderingKey {
            trade_date,
            source_row_id,
        }
    }

    pub fn from_transaction(txn: &Transaction) -> Self {
        Self::new(txn.trade_date, txn.source_row_id)
    }
}
