//! Render-ready views of a [`CapitalGainsReport`].
//!
//! Every output table has a fixed column set, so empty tables still render
//! a header row. JSON records use the same column names as the CSV headers.

use crate::domain::Decimal;
use crate::engine::{CapitalGainsReport, OpenPosition, OverallSummary, RealizedLot, ScripSummary};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub mod export;

pub use export::{to_csv_bytes, ReportError};

/// Decimal places kept in rendered cells. Proration can leave residue in
/// the last of rust_decimal's 28 digits.
pub const REPORT_DECIMAL_PLACES: u32 = 10;

fn amount(value: Decimal) -> String {
    value.round_dp(REPORT_DECIMAL_PLACES).to_canonical_string()
}

/// A row type of one output table.
pub trait Table: Serialize {
    /// File stem used for downloads, e.g. `realized_lots`.
    const NAME: &'static str;
    const HEADERS: &'static [&'static str];

    /// Cells in `HEADERS` order.
    fn to_record(&self) -> Vec<String>;
}

impl Table for RealizedLot {
    const NAME: &'static str = "realized_lots";
    const HEADERS: &'static [&'static str] = &[
        "Scrip",
        "BuyDate",
        "SellDate",
        "Qty",
        "HoldingDays",
        "Term",
        "BuyUnitCost",
        "BuyCostTotal",
        "SellUnitPrice",
        "SellProceedsGross",
        "SellCostsAllocated",
        "SellProceedsNet",
        "Gain",
        "BuyRef",
        "SellRef",
    ];

    fn to_record(&self) -> Vec<String> {
        vec![
            self.scrip.to_string(),
            self.buy_date.to_string(),
            self.sell_date.to_string(),
            amount(self.qty),
            self.holding_days.to_string(),
            self.term.to_string(),
            amount(self.buy_unit_cost),
            amount(self.buy_cost_total),
            amount(self.sell_unit_price),
            amount(self.sell_proceeds_gross),
            amount(self.sell_costs_allocated),
            amount(self.sell_proceeds_net),
            amount(self.gain),
            self.buy_ref.to_string(),
            self.sell_ref.to_string(),
        ]
    }
}

impl Table for ScripSummary {
    const NAME: &'static str = "per_scrip_summary";
    const HEADERS: &'static [&'static str] = &[
        "Scrip",
        "STCG_Total",
        "LTCG_Total",
        "Net_Total_Gain",
        "Total_Sell_Proceeds",
        "Total_Buy_Cost",
        "#Sells",
        "#MatchedLots",
    ];

    fn to_record(&self) -> Vec<String> {
        vec![
            self.scrip.to_string(),
            amount(self.stcg_total),
            amount(self.ltcg_total),
            amount(self.net_total_gain),
            amount(self.total_sell_proceeds),
            amount(self.total_buy_cost),
            self.sells.to_string(),
            self.matched_lots.to_string(),
        ]
    }
}

impl Table for OverallSummary {
    const NAME: &'static str = "overall_summary";
    const HEADERS: &'static [&'static str] = &[
        "STCG_Total",
        "LTCG_Total",
        "Net_Total_Gain",
        "Total_Sell_Proceeds",
        "Total_Buy_Cost",
        "#Sells",
        "#MatchedLots",
    ];

    fn to_record(&self) -> Vec<String> {
        vec![
            amount(self.stcg_total),
            amount(self.ltcg_total),
            amount(self.net_total_gain),
            amount(self.total_sell_proceeds),
            amount(self.total_buy_cost),
            self.sells.to_string(),
            self.matched_lots.to_string(),
        ]
    }
}

impl Table for OpenPosition {
    const NAME: &'static str = "open_positions";
    const HEADERS: &'static [&'static str] = &[
        "Scrip",
        "BuyDate",
        "QtyRemaining",
        "UnitCost",
        "TotalCost",
        "AgeDays",
        "BuyRef",
    ];

    fn to_record(&self) -> Vec<String> {
        vec![
            self.scrip.to_string(),
            self.buy_date.to_string(),
            amount(self.qty_remaining),
            amount(self.unit_cost),
            amount(self.total_cost),
            self.age_days.to_string(),
            self.buy_ref.to_string(),
        ]
    }
}

/// Selector for one of the four output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    RealizedLots,
    PerScripSummary,
    OverallSummary,
    OpenPositions,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::RealizedLots,
        TableKind::PerScripSummary,
        TableKind::OverallSummary,
        TableKind::OpenPositions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::RealizedLots => RealizedLot::NAME,
            TableKind::PerScripSummary => ScripSummary::NAME,
            TableKind::OverallSummary => OverallSummary::NAME,
            TableKind::OpenPositions => OpenPosition::NAME,
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            TableKind::RealizedLots => RealizedLot::HEADERS,
            TableKind::PerScripSummary => ScripSummary::HEADERS,
            TableKind::OverallSummary => OverallSummary::HEADERS,
            TableKind::OpenPositions => OpenPosition::HEADERS,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = String;

    /// Accepts the table name with or without a `.csv` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix(".csv").unwrap_or(s);
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| format!("unknown table: {}", s))
    }
}

impl CapitalGainsReport {
    /// CSV bytes (header row included) for one table.
    pub fn table_csv(&self, kind: TableKind) -> Result<Vec<u8>, ReportError> {
        match kind {
            TableKind::RealizedLots => to_csv_bytes(&self.realized_lots),
            TableKind::PerScripSummary => to_csv_bytes(&self.per_scrip_summary),
            TableKind::OverallSummary => to_csv_bytes(std::slice::from_ref(&self.overall_summary)),
            TableKind::OpenPositions => to_csv_bytes(&self.open_positions),
        }
    }

    /// Content hash over all four CSV tables, `sha256:<hex>`.
    pub fn fingerprint(&self) -> Result<String, ReportError> {
        export::fingerprint(self)
    }
}
