//! Summaries over realized fragments and the open-position snapshot.

use crate::domain::{Decimal, RowId, Scrip, Term, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{BuyLot, OpenPosition, RealizedLot};

/// Realized totals for one scrip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScripSummary {
    #[serde(rename = "Scrip")]
    pub scrip: Scrip,
    #[serde(rename = "STCG_Total")]
    pub stcg_total: Decimal,
    #[serde(rename = "LTCG_Total")]
    pub ltcg_total: Decimal,
    #[serde(rename = "Net_Total_Gain")]
    pub net_total_gain: Decimal,
    /// Net of allocated sell costs.
    #[serde(rename = "Total_Sell_Proceeds")]
    pub total_sell_proceeds: Decimal,
    #[serde(rename = "Total_Buy_Cost")]
    pub total_buy_cost: Decimal,
    /// Distinct sell rows.
    #[serde(rename = "#Sells")]
    pub sells: u64,
    /// Realized fragments.
    #[serde(rename = "#MatchedLots")]
    pub matched_lots: u64,
}

/// Column-wise sum of every [`ScripSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallSummary {
    #[serde(rename = "STCG_Total")]
    pub stcg_total: Decimal,
    #[serde(rename = "LTCG_Total")]
    pub ltcg_total: Decimal,
    #[serde(rename = "Net_Total_Gain")]
    pub net_total_gain: Decimal,
    #[serde(rename = "Total_Sell_Proceeds")]
    pub total_sell_proceeds: Decimal,
    #[serde(rename = "Total_Buy_Cost")]
    pub total_buy_cost: Decimal,
    #[serde(rename = "#Sells")]
    pub sells: u64,
    #[serde(rename = "#MatchedLots")]
    pub matched_lots: u64,
}

#[derive(Default)]
struct ScripAccumulator {
    stcg: Decimal,
    ltcg: Decimal,
    proceeds_net: Decimal,
    buy_cost: Decimal,
    sell_refs: BTreeSet<RowId>,
    fragments: u64,
}

impl ScripAccumulator {
    fn add(&mut self, lot: &RealizedLot) {
        match lot.term {
            Term::ShortTerm => self.stcg += lot.gain,
            Term::LongTerm => self.ltcg += lot.gain,
        }
        self.proceeds_net += lot.sell_proceeds_net;
        self.buy_cost += lot.buy_cost_total;
        self.sell_refs.insert(lot.sell_ref);
        self.fragments += 1;
    }

    fn finish(self, scrip: Scrip) -> ScripSummary {
        ScripSummary {
            scrip,
            stcg_total: self.stcg,
            ltcg_total: self.ltcg,
            net_total_gain: self.stcg + self.ltcg,
            total_sell_proceeds: self.proceeds_net,
            total_buy_cost: self.buy_cost,
            sells: self.sell_refs.len() as u64,
            matched_lots: self.fragments,
        }
    }
}

/// One summary row per scrip with realized fragments, ordered by scrip.
pub fn summarize_by_scrip(realized: &[RealizedLot]) -> Vec<ScripSummary> {
    let mut accumulators: BTreeMap<&Scrip, ScripAccumulator> = BTreeMap::new();
    for lot in realized {
        accumulators.entry(&lot.scrip).or_default().add(lot);
    }

    accumulators
        .into_iter()
        .map(|(scrip, acc)| acc.finish(scrip.clone()))
        .collect()
}

pub fn overall_summary(per_scrip: &[ScripSummary]) -> OverallSummary {
    per_scrip
        .iter()
        .fold(OverallSummary::default(), |mut total, row| {
            total.stcg_total += row.stcg_total;
            total.ltcg_total += row.ltcg_total;
            total.net_total_gain += row.net_total_gain;
            total.total_sell_proceeds += row.total_sell_proceeds;
            total.total_buy_cost += row.total_buy_cost;
            total.sells += row.sells;
            total.matched_lots += row.matched_lots;
            total
        })
}

/// Reference date for ageing open lots: the latest trade date anywhere in
/// the batch, or `fallback` when the batch is empty.
pub fn as_of_date(txns: &[Transaction], fallback: NaiveDate) -> NaiveDate {
    txns.iter()
        .map(|txn| txn.trade_date)
        .max()
        .unwrap_or(fallback)
}

pub fn open_positions(remaining: &[(Scrip, BuyLot)], as_of: NaiveDate) -> Vec<OpenPosition> {
    remaining
        .iter()
        .map(|(scrip, lot)| OpenPosition {
            scrip: scrip.clone(),
            buy_date: lot.acquisition_date,
            qty_remaining: lot.remaining_quantity,
            unit_cost: lot.unit_cost,
            total_cost: lot.remaining_quantity * lot.unit_cost,
            age_days: (as_of - lot.acquisition_date).num_days(),
            buy_ref: lot.source_row_id,
        })
        .collect()
}
