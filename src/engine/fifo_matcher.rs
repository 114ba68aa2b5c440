use std::collections::VecDeque;

use crate::domain::{Decimal, Scrip, Term};

use super::{
    BuyLot, EngineError, PreparedBuy, PreparedSell, RealizedLot, AVAILABILITY_EPSILON,
    LONG_TERM_THRESHOLD_DAYS, SETTLEMENT_EPSILON,
};

/// FIFO lot queue for a single scrip.
///
/// Lots are materialized once from the scrip's buys, oldest first. Sells
/// consume from the head of the queue; every (lot fragment, sell) pairing
/// emits one [`RealizedLot`].
pub struct FifoMatcher {
    scrip: Scrip,
    lots: VecDeque<BuyLot>,

    // Outputs accumulated during processing.
    realized: Vec<RealizedLot>,
}

impl FifoMatcher {
    /// Build the lot queue from `buys`, ordered by (trade_date, source_row_id).
    pub fn new(scrip: Scrip, buys: &[PreparedBuy]) -> Self {
        let mut ordered: Vec<&PreparedBuy> = buys.iter().collect();
        ordered.sort_by_key(|buy| buy.ordering_key());

        let lots = ordered
            .into_iter()
            .map(|buy| BuyLot {
                acquisition_date: buy.trade_date,
                remaining_quantity: buy.quantity,
                unit_cost: buy.unit_cost,
                source_row_id: buy.source_row_id,
            })
            .collect();

        Self {
            scrip,
            lots,
            realized: Vec::new(),
        }
    }

    /// Total quantity still open across all lots.
    pub fn available_quantity(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.remaining_quantity).sum()
    }

    /// Allocate one sell against the oldest open lots.
    ///
    /// Sells must be fed in (trade_date, source_row_id) order. The queue is
    /// left untouched when the sell is rejected.
    ///
    /// # Errors
    /// [`EngineError::InsufficientInventory`] if the open lots cannot cover
    /// the sell quantity.
    pub fn process_sell(&mut self, sell: &PreparedSell) -> Result<(), EngineError> {
        if self.available_quantity() + AVAILABILITY_EPSILON < sell.quantity {
            return Err(EngineError::InsufficientInventory {
                scrip: self.scrip.clone(),
                sell_row_id: sell.source_row_id,
            });
        }

        let mut still_needed = sell.quantity;
        while still_needed > SETTLEMENT_EPSILON {
            // The availability check admits a shortfall of up to
            // AVAILABILITY_EPSILON, so the queue may run dry first.
            let Some(lot) = self.lots.front_mut() else {
                break;
            };

            let take = lot.remaining_quantity.min(still_needed);
            let fraction = take / sell.quantity;

            let proceeds_gross = sell.gross * fraction;
            let costs_allocated = sell.costs_total * fraction;
            let proceeds_net = proceeds_gross - costs_allocated;
            let buy_cost_total = take * lot.unit_cost;
            let holding_days = (sell.trade_date - lot.acquisition_date).num_days();

            self.realized.push(RealizedLot {
                scrip: self.scrip.clone(),
                buy_date: lot.acquisition_date,
                sell_date: sell.trade_date,
                qty: take,
                holding_days,
                term: Term::classify(holding_days, LONG_TERM_THRESHOLD_DAYS),
                buy_unit_cost: lot.unit_cost,
                buy_cost_total,
                sell_unit_price: sell.price,
                sell_proceeds_gross: proceeds_gross,
                sell_costs_allocated: costs_allocated,
                sell_proceeds_net: proceeds_net,
                gain: proceeds_net - buy_cost_total,
                buy_ref: lot.source_row_id,
                sell_ref: sell.source_row_id,
            });

            lot.remaining_quantity -= take;
            still_needed -= take;
            if lot.remaining_quantity <= SETTLEMENT_EPSILON {
                self.lots.pop_front();
            }
        }

        Ok(())
    }

    /// Realized fragments in emission order, and the lots left open.
    pub fn into_outputs(self) -> (Vec<RealizedLot>, Vec<BuyLot>) {
        (self.realized, self.lots.into())
    }
}

/// Match all sells of one scrip against its buys.
pub fn match_scrip(
    scrip: &Scrip,
    buys: &[PreparedBuy],
    sells: &[PreparedSell],
) -> Result<(Vec<RealizedLot>, Vec<BuyLot>), EngineError> {
    let mut matcher = FifoMatcher::new(scrip.clone(), buys);

    let mut ordered: Vec<&PreparedSell> = sells.iter().collect();
    ordered.sort_by_key(|sell| sell.ordering_key());

    for sell in ordered {
        matcher.process_sell(sell)?;
    }

    Ok(matcher.into_outputs())
}
