//! Header aliases for the uploaded transaction sheet.

use std::collections::HashMap;

pub const TRADE_DATE: &str = "trade_date";
pub const SCRIP: &str = "scrip";
pub const ACTION: &str = "action";
pub const QUANTITY: &str = "quantity";
pub const PRICE: &str = "price";
pub const BROKERAGE: &str = "brokerage";
pub const CHARGES: &str = "charges";
pub const STT: &str = "stt";
pub const EXCHANGE: &str = "exchange";
pub const ISIN: &str = "isin";
pub const NOTES: &str = "notes";

pub const REQUIRED_FIELDS: &[&str] = &[TRADE_DATE, SCRIP, ACTION, QUANTITY, PRICE];

pub const OPTIONAL_FIELDS: &[&str] = &[BROKERAGE, CHARGES, STT, EXCHANGE, ISIN, NOTES];

/// Canonical field -> accepted header names (lower-case), in priority order.
pub const COLUMN_MAPPING: &[(&str, &[&str])] = &[
    (TRADE_DATE, &["tradedate", "trade_date", "date", "txn_date"]),
    (SCRIP, &["scrip", "symbol", "stock", "name"]),
    (ACTION, &["action", "type", "side"]),
    (QUANTITY, &["quantity", "qty", "shares"]),
    (PRICE, &["price", "rate", "unitprice"]),
    (BROKERAGE, &["brokerage", "broker", "brokerage_amt"]),
    (CHARGES, &["charges", "fees", "other_charges"]),
    (STT, &["stt", "sebi_stt", "stt_amt"]),
    (EXCHANGE, &["exchange", "exch"]),
    (ISIN, &["isin"]),
    (NOTES, &["notes", "remark", "remarks"]),
];

/// Resolved canonical field -> column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(HashMap<&'static str, usize>);

impl ColumnMap {
    pub fn get(&self, field: &str) -> Option<usize> {
        self.0.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Required fields with no matching header, in declaration order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !self.contains(field))
            .collect()
    }
}

/// Match headers (case-insensitive, trimmed) against [`COLUMN_MAPPING`].
///
/// For each canonical field the first alias present wins; if the same
/// header appears twice, its first column is used.
pub fn resolve_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> ColumnMap {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.into_iter().enumerate() {
        by_name.entry(header.trim().to_lowercase()).or_insert(idx);
    }

    let mut resolved = HashMap::new();
    for (canonical, aliases) in COLUMN_MAPPING {
        if let Some(idx) = aliases.iter().find_map(|alias| by_name.get(*alias)) {
            resolved.insert(*canonical, *idx);
        }
    }
    ColumnMap(resolved)
}
