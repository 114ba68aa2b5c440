//! Pure computation engine for FIFO capital gains.
//!
//! The pipeline runs in three stages per scrip: row preparation, FIFO lot
//! matching and aggregation. A batch either produces a complete
//! [`CapitalGainsReport`] or fails as a whole.

use crate::domain::{Decimal, RowId, Scrip, Term, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod aggregate;
pub mod fifo_matcher;
pub mod prepare;

pub use aggregate::{OverallSummary, ScripSummary};
pub use fifo_matcher::FifoMatcher;
pub use prepare::{prepare_rows, PreparedBuy, PreparedRows, PreparedSell};

/// Tolerance when checking that open lots can cover a sell.
pub const AVAILABILITY_EPSILON: Decimal = Decimal::from_parts(1, 9);

/// Residue below which a sell counts as fully allocated and a lot as
/// fully consumed.
pub const SETTLEMENT_EPSILON: Decimal = Decimal::from_parts(1, 12);

/// Holding period (in days) at which a gain becomes long-term.
pub const LONG_TERM_THRESHOLD_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Sell exceeds available buys for {scrip} on row {sell_row_id}")]
    InsufficientInventory { scrip: Scrip, sell_row_id: RowId },
    #[error("Numeric values for {scrip} on row {row_id} are out of range")]
    ValueOutOfRange { scrip: Scrip, row_id: RowId },
    #[error("Batch totals exceed the supported numeric range")]
    BatchOutOfRange,
}

/// An open purchase lot in a scrip's FIFO queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyLot {
    pub acquisition_date: NaiveDate,
    /// Quantity not yet matched; only ever decreases.
    pub remaining_quantity: Decimal,
    /// Price plus per-unit share of brokerage and charges.
    pub unit_cost: Decimal,
    pub source_row_id: RowId,
}

/// One (lot fragment x sell) match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RealizedLot {
    pub scrip: Scrip,
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub qty: Decimal,
    pub holding_days: i64,
    pub term: Term,
    pub buy_unit_cost: Decimal,
    pub buy_cost_total: Decimal,
    pub sell_unit_price: Decimal,
    pub sell_proceeds_gross: Decimal,
    pub sell_costs_allocated: Decimal,
    pub sell_proceeds_net: Decimal,
    pub gain: Decimal,
    pub buy_ref: RowId,
    pub sell_ref: RowId,
}

/// Unsold remainder of a purchase lot at the end of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpenPosition {
    pub scrip: Scrip,
    pub buy_date: NaiveDate,
    pub qty_remaining: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    /// Days between the buy and the latest trade date in the batch.
    pub age_days: i64,
    pub buy_ref: RowId,
}

/// The four output tables of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapitalGainsReport {
    pub realized_lots: Vec<RealizedLot>,
    pub per_scrip_summary: Vec<ScripSummary>,
    pub overall_summary: OverallSummary,
    pub open_positions: Vec<OpenPosition>,
}

/// Run the engine, ageing open positions against today's date when the
/// batch is empty.
pub fn process_transactions(txns: &[Transaction]) -> Result<CapitalGainsReport, EngineError> {
    process_transactions_as_of(txns, chrono::Local::now().date_naive())
}

/// Run the engine over one closed batch.
///
/// `fallback_as_of` is only used as the open-position reference date when
/// `txns` is empty; otherwise the latest trade date in the batch is used.
///
/// # Errors
/// [`EngineError::ValueOutOfRange`] or [`EngineError::BatchOutOfRange`] if
/// the amounts cannot be computed without overflow.
/// Returns [`EngineError::InsufficientInventory`] for the first sell (in scrip
/// order, then trade order) that its scrip's open lots cannot cover. No
/// partial output is produced.
pub fn process_transactions_as_of(
    txns: &[Transaction],
    fallback_as_of: NaiveDate,
) -> Result<CapitalGainsReport, EngineError> {
    let PreparedRows { buys, sells } = prepare_rows(txns)?;

    // BTreeMap keeps scrips in lexicographic order.
    let mut by_scrip: BTreeMap<Scrip, (Vec<PreparedBuy>, Vec<PreparedSell>)> = BTreeMap::new();
    for buy in buys {
        by_scrip.entry(buy.scrip.clone()).or_default().0.push(buy);
    }
    for sell in sells {
        by_scrip.entry(sell.scrip.clone()).or_default().1.push(sell);
    }

    let mut realized_lots = Vec::new();
    let mut remaining_lots: Vec<(Scrip, BuyLot)> = Vec::new();

    for (scrip, (scrip_buys, scrip_sells)) in by_scrip {
        if scrip_buys.is_empty() && scrip_sells.is_empty() {
            continue;
        }

        let (realized, lots) = match fifo_matcher::match_scrip(&scrip, &scrip_buys, &scrip_sells) {
            Ok(outputs) => outputs,
            Err(err) => {
                tracing::warn!(%scrip, error = %err, "rejecting transaction batch");
                return Err(err);
            }
        };

        tracing::debug!(
            %scrip,
            buys = scrip_buys.len(),
            sells = scrip_sells.len(),
            fragments = realized.len(),
            open_lots = lots.len(),
            "matched scrip"
        );

        realized_lots.extend(realized);
        remaining_lots.extend(lots.into_iter().map(|lot| (scrip.clone(), lot)));
    }

    let per_scrip_summary = aggregate::summarize_by_scrip(&realized_lots);
    let overall_summary = aggregate::overall_summary(&per_scrip_summary);
    let as_of = aggregate::as_of_date(txns, fallback_as_of);
    let open_positions = aggregate::open_positions(&remaining_lots, as_of);

    tracing::info!(
        transactions = txns.len(),
        realized = realized_lots.len(),
        open = open_positions.len(),
        "processed transaction batch"
    );

    Ok(CapitalGainsReport {
        realized_lots,
        per_scrip_summary,
        overall_summary,
        open_positions,
    })
}
