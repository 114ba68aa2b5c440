//! Reading and validating an uploaded CSV transaction sheet.

use super::mapping::{self, resolve_columns, ColumnMap};
use super::{IngestError, IngestOutcome, ValidationReport};
use crate::domain::{Action, Decimal, RowId, Scrip, Transaction};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%b-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub const ERR_EMPTY: &str = "Uploaded sheet is empty";
pub const ERR_ACTION: &str = "Unknown action values present; allowed BUY/SELL";
pub const ERR_DATE: &str = "Some trade dates are invalid or missing";
pub const ERR_QUANTITY: &str = "Quantities must be positive";
pub const ERR_PRICE: &str = "Prices must be non-negative";
pub const ERR_COSTS: &str = "Costs must be non-negative";
pub const ERR_NUMERIC: &str = "Some numeric values could not be parsed";
pub const ERR_SCRIP: &str = "Some scrips are blank";
pub const ERR_RANGE: &str = "Some numeric values are out of range";
pub const WARN_FRACTIONAL: &str = "Some quantities are fractional; treating as-is";

/// Parse a trade date in any of the accepted layouts.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Row-level problems, each reported at most once per sheet.
#[derive(Debug, Default)]
struct Findings {
    bad_action: bool,
    bad_date: bool,
    bad_quantity: bool,
    bad_price: bool,
    bad_costs: bool,
    bad_numeric: bool,
    blank_scrip: bool,
    out_of_range: bool,
}

impl Findings {
    fn into_errors(self) -> Vec<String> {
        [
            (self.bad_action, ERR_ACTION),
            (self.bad_date, ERR_DATE),
            (self.bad_quantity, ERR_QUANTITY),
            (self.bad_price, ERR_PRICE),
            (self.bad_costs, ERR_COSTS),
            (self.bad_numeric, ERR_NUMERIC),
            (self.blank_scrip, ERR_SCRIP),
            (self.out_of_range, ERR_RANGE),
        ]
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, msg)| msg.to_string())
        .collect()
    }
}

struct RowReader<'a> {
    columns: &'a ColumnMap,
    record: &'a csv::StringRecord,
}

impl<'a> RowReader<'a> {
    fn text(&self, field: &str) -> &'a str {
        self.columns
            .get(field)
            .and_then(|idx| self.record.get(idx))
            .map(str::trim)
            .unwrap_or("")
    }

    fn required_number(&self, field: &str, findings: &mut Findings) -> Option<Decimal> {
        match Decimal::from_str_canonical(self.text(field)) {
            Ok(value) => Some(value),
            Err(_) => {
                findings.bad_numeric = true;
                None
            }
        }
    }

    /// Blank or absent optional numerics default to zero.
    fn optional_number(&self, field: &str, findings: &mut Findings) -> Decimal {
        let raw = self.text(field);
        if raw.is_empty() {
            return Decimal::zero();
        }
        match Decimal::from_str_canonical(raw) {
            Ok(value) => {
                if value.is_negative() {
                    findings.bad_costs = true;
                }
                value
            }
            Err(_) => {
                findings.bad_numeric = true;
                Decimal::zero()
            }
        }
    }
}

/// Read, validate and canonicalize a CSV transaction sheet.
///
/// Row-level problems are collected into the returned report; when it has
/// errors no transactions are returned.
///
/// # Errors
/// [`IngestError::Csv`] if the bytes are not readable as CSV.
pub fn read_transactions(bytes: &[u8]) -> Result<IngestOutcome, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv(e.to_string()))?
        .clone();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Csv(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(record);
    }

    let mut report = ValidationReport::default();
    if records.is_empty() {
        report.errors.push(ERR_EMPTY.to_string());
        return Ok(IngestOutcome::rejected(report));
    }

    let columns = resolve_columns(headers.iter());
    for field in columns.missing_required() {
        report
            .errors
            .push(format!("Missing required column: {}", field));
    }
    if report.has_errors() {
        return Ok(IngestOutcome::rejected(report));
    }

    let mut findings = Findings::default();
    let mut transactions = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let row = RowReader {
            columns: &columns,
            record,
        };

        let trade_date = parse_trade_date(row.text(mapping::TRADE_DATE));
        findings.bad_date |= trade_date.is_none();

        let scrip = row.text(mapping::SCRIP);
        findings.blank_scrip |= scrip.is_empty();

        let action = row.text(mapping::ACTION).parse::<Action>().ok();
        findings.bad_action |= action.is_none();

        let quantity = row.required_number(mapping::QUANTITY, &mut findings);
        findings.bad_quantity |= quantity.is_some_and(|q| !q.is_positive());

        let price = row.required_number(mapping::PRICE, &mut findings);
        findings.bad_price |= price.is_some_and(|p| p.is_negative());

        let brokerage = row.optional_number(mapping::BROKERAGE, &mut findings);
        let charges = row.optional_number(mapping::CHARGES, &mut findings);
        let stt = row.optional_number(mapping::STT, &mut findings);

        if let (Some(trade_date), Some(action), Some(quantity), Some(price)) =
            (trade_date, action, quantity, price)
        {
            let notional = price
                .checked_mul(quantity)
                .and_then(|v| v.checked_add(brokerage))
                .and_then(|v| v.checked_add(charges))
                .and_then(|v| v.checked_add(stt));
            findings.out_of_range |= notional.is_none();

            transactions.push(
                Transaction::new(
                    RowId::new(idx as u64 + 1),
                    trade_date,
                    Scrip::new(scrip),
                    action,
                    quantity,
                    price,
                )
                .with_costs(brokerage, charges, stt)
                .with_details(
                    row.text(mapping::EXCHANGE),
                    row.text(mapping::ISIN),
                    row.text(mapping::NOTES),
                ),
            );
        }
    }

    report.errors.extend(findings.into_errors());
    if report.has_errors() {
        return Ok(IngestOutcome::rejected(report));
    }

    if transactions.iter().any(|t| t.quantity.is_fractional()) {
        report.warnings.push(WARN_FRACTIONAL.to_string());
    }
    report.warnings.extend(sells_before_first_buy(&transactions));

    tracing::debug!(
        rows = transactions.len(),
        warnings = report.warnings.len(),
        "ingested transaction sheet"
    );

    Ok(IngestOutcome {
        transactions,
        report,
    })
}

/// Warn for each scrip whose earliest sell predates its earliest buy.
fn sells_before_first_buy(txns: &[Transaction]) -> Vec<String> {
    let mut first: BTreeMap<&Scrip, (Option<NaiveDate>, Option<NaiveDate>)> = BTreeMap::new();
    for txn in txns {
        let entry = first.entry(&txn.scrip).or_default();
        let slot = match txn.action {
            Action::Buy => &mut entry.0,
            Action::Sell => &mut entry.1,
        };
        *slot = Some(slot.map_or(txn.trade_date, |d| d.min(txn.trade_date)));
    }

    first
        .into_iter()
        .filter_map(|(scrip, dates)| match dates {
            (Some(buy), Some(sell)) if sell < buy => Some(format!(
                "Sells for {} precede its first buy; holding periods may be negative",
                scrip
            )),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "TradeDate,Scrip,Action,Quantity,Price,Brokerage,Charges,STT,Exchange,ISIN,Notes\n";

    fn read(body: &str) -> IngestOutcome {
        read_transactions(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_trade_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        assert_eq!(parse_trade_date("2023-03-05"), Some(expected));
        assert_eq!(parse_trade_date("05-03-2023"), Some(expected));
        assert_eq!(parse_trade_date("05/03/2023"), Some(expected));
        assert_eq!(parse_trade_date("2023/03/05"), Some(expected));
        assert_eq!(parse_trade_date("05-Mar-2023"), Some(expected));
        assert_eq!(parse_trade_date("2023-03-05 00:00:00"), Some(expected));
        assert_eq!(parse_trade_date("yesterday"), None);
        assert_eq!(parse_trade_date(""), None);
    }

    #[test]
    fn test_reads_sample_sheet() {
        let body = format!(
            "{}2023-01-01,TCS,BUY,100,3000,10,5,0,NSE,INE467B01029,Initial buy\n\
             2023-06-15, TCS ,sell,80,3300,12,6,3,NSE,INE467B01029,Partial sell\n",
            HEADER
        );
        let outcome = read(&body);

        assert!(outcome.report.is_ok());
        assert!(outcome.report.warnings.is_empty());
        assert_eq!(outcome.transactions.len(), 2);

        let sell = &outcome.transactions[1];
        assert_eq!(sell.source_row_id, RowId::new(2));
        assert_eq!(sell.scrip.as_str(), "TCS");
        assert_eq!(sell.action, Action::Sell);
        assert_eq!(sell.stt, Decimal::from(3));
        assert_eq!(sell.exchange, "NSE");
        assert_eq!(sell.notes, "Partial sell");
    }

    #[test]
    fn test_optional_columns_default_to_zero() {
        let outcome = read("date,symbol,side,qty,rate\n2023-01-01,INFY,BUY,10,100\n");
        assert!(outcome.report.is_ok());
        let txn = &outcome.transactions[0];
        assert!(txn.brokerage.is_zero());
        assert!(txn.charges.is_zero());
        assert!(txn.stt.is_zero());
    }

    #[test]
    fn test_empty_sheet() {
        let outcome = read(HEADER);
        assert_eq!(outcome.report.errors, vec![ERR_EMPTY.to_string()]);
        assert!(outcome.transactions.is_empty());
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let body = format!("{},,,,,,,,,,\n2023-01-01,TCS,BUY,1,10,,,,,,\n", HEADER);
        let outcome = read(&body);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.transactions[0].source_row_id, RowId::new(1));
    }

    #[test]
    fn test_missing_required_columns() {
        let outcome = read("date,scrip,qty\n2023-01-01,TCS,1\n");
        assert_eq!(
            outcome.report.errors,
            vec![
                "Missing required column: action".to_string(),
                "Missing required column: price".to_string(),
            ]
        );
    }

    #[test]
    fn test_row_errors_reported_once_each() {
        let body = format!(
            "{}2023-01-01,TCS,HOLD,1,10,,,,,,\n\
             not-a-date,TCS,BUY,0,-1,,,,,,\n\
             2023-01-02,TCS,BUY,-5,10,-2,,,,,\n\
             2023-01-03,,SELL,abc,10,,,,,,\n",
            HEADER
        );
        let outcome = read(&body);
        assert!(outcome.transactions.is_empty());
        assert_eq!(
            outcome.report.errors,
            vec![
                ERR_ACTION.to_string(),
                ERR_DATE.to_string(),
                ERR_QUANTITY.to_string(),
                ERR_PRICE.to_string(),
                ERR_COSTS.to_string(),
                ERR_NUMERIC.to_string(),
                ERR_SCRIP.to_string(),
            ]
        );
    }

    #[test]
    fn test_fractional_quantity_warning() {
        let body = format!("{}2023-01-01,TCS,BUY,1.5,10,,,,,,\n", HEADER);
        let outcome = read(&body);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.report.warnings, vec![WARN_FRACTIONAL.to_string()]);
    }

    #[test]
    fn test_sell_before_first_buy_warning() {
        let body = format!(
            "{}2023-02-01,TCS,BUY,1,10,,,,,,\n\
             2023-01-01,TCS,SELL,1,12,,,,,,\n\
             2023-01-01,INFY,BUY,1,10,,,,,,\n\
             2023-01-05,INFY,SELL,1,12,,,,,,\n",
            HEADER
        );
        let outcome = read(&body);
        assert_eq!(
            outcome.report.warnings,
            vec!["Sells for TCS precede its first buy; holding periods may be negative".to_string()]
        );
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        let body = format!(
            "{}2023-01-01,TCS,BUY,100000000000000000,1000000000000,,,,,,\n\
             2023-01-02,TCS,BUY,1,10,,,,,,\n",
            HEADER
        );
        let outcome = read(&body);
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.report.errors, vec![ERR_RANGE.to_string()]);
    }
}
