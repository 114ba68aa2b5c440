//! Canonical transaction row consumed by the gains engine.

use crate::domain::{Action, Decimal, RowId, Scrip};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single validated BUY or SELL row.
///
/// Produced by the ingest layer; the engine assumes `quantity > 0`,
/// `price >= 0` and non-negative costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// 1-based position of the row in the uploaded sheet.
    pub source_row_id: RowId,
    pub trade_date: NaiveDate,
    pub scrip: Scrip,
    pub action: Action,
    pub quantity: Decimal,
    /// Price per unit.
    pub price: Decimal,
    pub brokerage: Decimal,
    pub charges: Decimal,
    /// Securities transaction tax; only meaningful on sells.
    pub stt: Decimal,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exchange: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub isin: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Transaction {
    /// Create a transaction with zero costs and no descriptive fields.
    pub fn new(
        source_row_id: RowId,
        trade_date: NaiveDate,
        scrip: Scrip,
        action: Action,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Transaction {
            source_row_id,
            trade_date,
            scrip,
            action,
            quantity,
            price,
            brokerage: Decimal::zero(),
            charges: Decimal::zero(),
            stt: Decimal::zero(),
            exchange: String::new(),
            isin: String::new(),
            notes: String::new(),
        }
    }

    /// Set brokerage, other charges and STT.
    pub fn with_costs(mut self, brokerage: Decimal, charges: Decimal, stt: Decimal) -> Self {
        self.brokerage = brokerage;
        self.charges = charges;
        self.stt = stt;
        self
    }

    /// Attach the pass-through descriptive columns.
    pub fn with_details(
        mut self,
        exchange: impl Into<String>,
        isin: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        self.exchange = exchange.into();
        self.isin = isin.into();
        self.notes = notes.into();
        self
    }
}
