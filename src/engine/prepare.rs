//! Row preparation: split canonical rows into buys and sells with derived
//! cost fields.

use crate::domain::{Action, Decimal, RowId, Scrip, TradeOrderingKey, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal as RustDecimal;

use super::EngineError;

/// Upper bound on the summed notional (amounts plus costs) of one batch.
///
/// Aggregates are at most twice this, well inside the decimal range.
pub fn max_batch_notional() -> Decimal {
    Decimal::new(RustDecimal::from_i128_with_scale(10_i128.pow(27), 0))
}

fn out_of_range(txn: &Transaction) -> EngineError {
    EngineError::ValueOutOfRange {
        scrip: txn.scrip.clone(),
        row_id: txn.source_row_id,
    }
}

/// A BUY row with acquisition costs folded into a per-unit cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBuy {
    pub source_row_id: RowId,
    pub trade_date: NaiveDate,
    pub scrip: Scrip,
    pub quantity: Decimal,
    /// `(price * quantity + brokerage + charges) / quantity`
    pub unit_cost: Decimal,
}

/// A SELL row with gross proceeds and total disposal costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSell {
    pub source_row_id: RowId,
    pub trade_date: NaiveDate,
    pub scrip: Scrip,
    pub quantity: Decimal,
    pub price: Decimal,
    /// `price * quantity`
    pub gross: Decimal,
    /// `brokerage + charges + stt`
    pub costs_total: Decimal,
    /// `gross - costs_total`
    pub net: Decimal,
}

impl PreparedBuy {
    /// # Errors
    /// [`EngineError::ValueOutOfRange`] if the cost basis overflows or the
    /// quantity is zero.
    pub fn from_transaction(txn: &Transaction) -> Result<Self, EngineError> {
        let unit_cost = txn
            .price
            .checked_mul(txn.quantity)
            .and_then(|gross| gross.checked_add(txn.brokerage))
            .and_then(|basis| basis.checked_add(txn.charges))
            .and_then(|basis| basis.checked_div(txn.quantity))
            .ok_or_else(|| out_of_range(txn))?;

        Ok(PreparedBuy {
            source_row_id: txn.source_row_id,
            trade_date: txn.trade_date,
            scrip: txn.scrip.clone(),
            quantity: txn.quantity,
            unit_cost,
        })
    }

    fn notional(&self) -> Option<Decimal> {
        self.unit_cost.checked_mul(self.quantity)
    }

    pub fn ordering_key(&self) -> TradeOrderingKey {
        TradeOrderingKey::new(self.trade_date, self.source_row_id)
    }
}

impl PreparedSell {
    /// # Errors
    /// [`EngineError::ValueOutOfRange`] if proceeds or costs overflow.
    pub fn from_transaction(txn: &Transaction) -> Result<Self, EngineError> {
        let gross = txn
            .price
            .checked_mul(txn.quantity)
            .ok_or_else(|| out_of_range(txn))?;
        let costs_total = txn
            .brokerage
            .checked_add(txn.charges)
            .and_then(|c| c.checked_add(txn.stt))
            .ok_or_else(|| out_of_range(txn))?;
        let net = gross
            .checked_sub(costs_total)
            .ok_or_else(|| out_of_range(txn))?;

        Ok(PreparedSell {
            source_row_id: txn.source_row_id,
            trade_date: txn.trade_date,
            scrip: txn.scrip.clone(),
            quantity: txn.quantity,
            price: txn.price,
            gross,
            costs_total,
            net,
        })
    }

    fn notional(&self) -> Option<Decimal> {
        self.gross.checked_add(self.costs_total)
    }

    pub fn ordering_key(&self) -> TradeOrderingKey {
        TradeOrderingKey::new(self.trade_date, self.source_row_id)
    }
}

/// Buys and sells of one batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedRows {
    pub buys: Vec<PreparedBuy>,
    pub sells: Vec<PreparedSell>,
}

/// Partition rows by action and compute derived fields. Input order is kept.
///
/// # Errors
/// [`EngineError::ValueOutOfRange`] for the first row whose amounts overflow,
/// [`EngineError::BatchOutOfRange`] if the batch notional exceeds
/// [`max_batch_notional`].
pub fn prepare_rows(txns: &[Transaction]) -> Result<PreparedRows, EngineError> {
    let limit = max_batch_notional();
    let mut rows = PreparedRows::default();
    let mut total = Decimal::zero();

    for txn in txns {
        let notional = match txn.action {
            Action::Buy => {
                let buy = PreparedBuy::from_transaction(txn)?;
                let notional = buy.notional();
                rows.buys.push(buy);
                notional
            }
            Action::Sell => {
                let sell = PreparedSell::from_transaction(txn)?;
                let notional = sell.notional();
                rows.sells.push(sell);
                notional
            }
        };

        total = notional
            .map(|n| n.abs())
            .and_then(|n| total.checked_add(n))
            .filter(|t| *t <= limit)
            .ok_or(EngineError::BatchOutOfRange)?;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn row(id: u64, action: Action, qty: &str, px: &str) -> Transaction {
        Transaction::new(
            RowId::new(id),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            Scrip::new("TCS"),
            action,
            d(qty),
            d(px),
        )
    }

    #[test]
    fn test_buy_unit_cost_includes_brokerage_and_charges() {
        let txn = row(1, Action::Buy, "100", "100").with_costs(d("10"), d("5"), d("0"));
        let buy = PreparedBuy::from_transaction(&txn).unwrap();
        assert_eq!(buy.unit_cost, d("100.15"));
    }

    #[test]
    fn test_buy_ignores_stt() {
        let txn = row(1, Action::Buy, "10", "50").with_costs(d("0"), d("0"), d("99"));
        let buy = PreparedBuy::from_transaction(&txn).unwrap();
        assert_eq!(buy.unit_cost, d("50"));
    }

    #[test]
    fn test_sell_costs_and_net() {
        let txn = row(3, Action::Sell, "150", "150").with_costs(d("10"), d("0"), d("5"));
        let sell = PreparedSell::from_transaction(&txn).unwrap();
        assert_eq!(sell.gross, d("22500"));
        assert_eq!(sell.costs_total, d("15"));
        assert_eq!(sell.net, d("22485"));
        assert_eq!(sell.price, d("150"));
    }

    #[test]
    fn test_prepare_rows_partitions_and_keeps_order() {
        let txns = vec![
            row(1, Action::Buy, "1", "10"),
            row(2, Action::Sell, "1", "12"),
            row(3, Action::Buy, "2", "11"),
        ];
        let rows = prepare_rows(&txns).unwrap();

        let buy_ids: Vec<u64> = rows.buys.iter().map(|b| b.source_row_id.as_u64()).collect();
        let sell_ids: Vec<u64> = rows.sells.iter().map(|s| s.source_row_id.as_u64()).collect();
        assert_eq!(buy_ids, vec![1, 3]);
        assert_eq!(sell_ids, vec![2]);
    }

    #[test]
    fn test_prepare_rows_empty() {
        assert_eq!(prepare_rows(&[]).unwrap(), PreparedRows::default());
    }

    #[test]
    fn test_overflowing_row_is_rejected() {
        let txn = row(7, Action::Buy, "100000000000000000", "1000000000000");
        assert_eq!(
            prepare_rows(&[txn]),
            Err(EngineError::ValueOutOfRange {
                scrip: Scrip::new("TCS"),
                row_id: RowId::new(7),
            })
        );
    }

    #[test]
    fn test_zero_quantity_buy_is_rejected() {
        let txn = row(4, Action::Buy, "0", "10");
        assert!(PreparedBuy::from_transaction(&txn).is_err());
    }

    #[test]
    fn test_batch_notional_is_bounded() {
        // Each row fits on its own; together they exceed the batch limit.
        let txns = vec![
            row(1, Action::Buy, "1000000000000000", "600000000000"),
            row(2, Action::Buy, "1000000000000000", "600000000000"),
        ];
        assert_eq!(prepare_rows(&txns[..1]).map(|r| r.buys.len()), Ok(1));
        assert_eq!(prepare_rows(&txns), Err(EngineError::BatchOutOfRange));
    }
}
