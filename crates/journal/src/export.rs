//! CSV and JSON encodings of the trade log.

use crate::error::JournalError;
use chrono::{NaiveDate, NaiveDateTime};
use core_types::{JournalEntry, Trade, TradeDraft, TradeType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

/// Column order of the exported trade log.
pub const CSV_HEADER: [&str; 11] = [
    "date",
    "symbol",
    "entry_price",
    "exit_price",
    "position_size",
    "trade_type",
    "stop_loss",
    "take_profit",
    "notes",
    "pnl",
    "roi",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One exported row. `pnl` and `roi` are derived at write time.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    symbol: &'a str,
    entry_price: Decimal,
    exit_price: Decimal,
    position_size: Decimal,
    trade_type: TradeType,
    stop_loss: Option<Decimal>,
    take_profit: Option<Decimal>,
    notes: Option<&'a str>,
    pnl: Decimal,
    roi: Decimal,
}

impl<'a> From<&'a Trade> for CsvRow<'a> {
    fn from(trade: &'a Trade) -> Self {
        Self {
            date: trade.date.format(DATE_FORMAT).to_string(),
            symbol: &trade.symbol,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            position_size: trade.position_size,
            trade_type: trade.trade_type,
            stop_loss: trade.stop_loss,
            take_profit: trade.take_profit,
            notes: trade.notes.as_deref(),
            pnl: trade.pnl(),
            roi: trade.roi(),
        }
    }
}

/// A row as read back. Numbers stay text until validated so errors can name the column.
/// Unknown columns such as `pnl` and `roi` are ignored.
#[derive(Debug, Deserialize)]
struct ImportRow {
    date: String,
    symbol: String,
    entry_price: String,
    exit_price: String,
    position_size: String,
    trade_type: String,
    #[serde(default)]
    stop_loss: Option<String>,
    #[serde(default)]
    take_profit: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
}

/// Writes the header and one row per trade, in slice order.
///
/// The 11 columns have no strategy; labels do not survive an export and re-import.
pub fn trades_to_csv(trades: &[Trade]) -> Result<String, JournalError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for trade in trades {
        writer.serialize(CsvRow::from(trade))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Parses a trade log in the export format.
///
/// Each row is validated like a submitted form. The first invalid row fails the
/// whole read, reporting its line number.
pub fn trades_from_csv<R: Read>(reader: R) -> Result<Vec<Trade>, JournalError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut trades = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row: ImportRow = record.deserialize(Some(&headers))?;
        let trade = row_to_trade(row).map_err(|reason| JournalError::InvalidRecord { line, reason })?;
        trades.push(trade);
    }

    Ok(trades)
}

#[derive(Serialize)]
struct SessionSnapshot<'a> {
    trades: &'a [Trade],
    journal_entries: &'a [JournalEntry],
}

/// Pretty-printed JSON holding both collections.
pub fn session_to_json(
    trades: &[Trade],
    journal_entries: &[JournalEntry],
) -> Result<String, JournalError> {
    Ok(serde_json::to_string_pretty(&SessionSnapshot {
        trades,
        journal_entries,
    })?)
}

fn row_to_trade(row: ImportRow) -> Result<Trade, String> {
    let date = parse_date(&row.date)?;
    let draft = TradeDraft {
        date: Some(date),
        symbol: row.symbol,
        trade_type: TradeType::from_str(&row.trade_type).map_err(|e| e.to_string())?,
        entry_price: parse_decimal("entry_price", &row.entry_price)?,
        exit_price: parse_decimal("exit_price", &row.exit_price)?,
        position_size: parse_decimal("position_size", &row.position_size)?,
        stop_loss: parse_optional_decimal("stop_loss", row.stop_loss.as_deref())?,
        take_profit: parse_optional_decimal("take_profit", row.take_profit.as_deref())?,
        notes: row.notes,
        strategy: row.strategy,
    };
    draft.into_trade(date).map_err(|e| e.to_string())
}

fn parse_date(value: &str) -> Result<NaiveDateTime, String> {
    const DATETIME_FORMATS: [&str; 3] = [DATE_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("unrecognised date '{value}'"))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value).map_err(|_| format!("{field} is not a number: '{value}'"))
}

fn parse_optional_decimal(field: &str, value: Option<&str>) -> Result<Option<Decimal>, String> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => parse_decimal(field, v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_trade() -> Trade {
        Trade {
            date: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
            symbol: "AAPL".to_string(),
            entry_price: dec!(100),
            exit_price: dec!(110),
            position_size: dec!(10),
            trade_type: TradeType::Long,
            stop_loss: None,
            take_profit: None,
            notes: None,
            strategy: None,
        }
    }

    #[test]
    fn single_trade_export_has_all_columns() {
        let csv = trades_to_csv(&[sample_trade()]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), 11);
        assert_eq!(row[0], "2024-02-01 14:05:00");
        assert_eq!(row[1], "AAPL");
        assert_eq!(row[5], "LONG");
        assert_eq!(&row[6..9], &["", "", ""]);
        assert_eq!(Decimal::from_str(row[9]).unwrap(), dec!(100));
        assert_eq!(Decimal::from_str(row[10]).unwrap(), dec!(10));
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_log_exports_header_only() {
        let csv = trades_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), CSV_HEADER.join(","));
    }

    #[test]
    fn notes_with_commas_are_quoted() {
        let mut trade = sample_trade();
        trade.notes = Some("late entry, chased".to_string());
        let csv = trades_to_csv(&[trade]).unwrap();
        assert!(csv.contains("\"late entry, chased\""));
    }

    #[test]
    fn export_reads_back() {
        let mut trade = sample_trade();
        trade.stop_loss = Some(dec!(95));
        trade.notes = Some("clean breakout".to_string());
        let csv = trades_to_csv(&[trade.clone()]).unwrap();

        let parsed = trades_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed, vec![trade]);
    }

    #[test]
    fn strategy_labels_are_not_exported() {
        let mut trade = sample_trade();
        trade.strategy = Some("Breakout".to_string());
        let csv = trades_to_csv(&[trade]).unwrap();

        assert!(!csv.contains("Breakout"));
        let parsed = trades_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed[0].strategy, None);
    }

    #[test]
    fn import_accepts_strategy_column_and_date_only() {
        let input = "date,symbol,entry_price,exit_price,position_size,trade_type,strategy\n\
                     2024-03-01,tsla,200,190,3,short,Reversal\n";
        let trades = trades_from_csv(input.as_bytes()).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].symbol, "TSLA");
        assert_eq!(trades[0].trade_type, TradeType::Short);
        assert_eq!(trades[0].strategy.as_deref(), Some("Reversal"));
        assert_eq!(trades[0].pnl(), dec!(30));
    }

    #[test]
    fn import_reports_line_of_invalid_row() {
        let input = "date,symbol,entry_price,exit_price,position_size,trade_type\n\
                     2024-03-01 10:00:00,AAPL,100,101,1,LONG\n\
                     2024-03-02 10:00:00,AAPL,0,101,1,LONG\n";
        match trades_from_csv(input.as_bytes()) {
            Err(JournalError::InvalidRecord { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("entry_price"));
            }
            other => panic!("expected invalid record, got {other:?}"),
        }
    }

    #[test]
    fn import_rejects_unparseable_numbers() {
        let input = "date,symbol,entry_price,exit_price,position_size,trade_type\n\
                     2024-03-01 10:00:00,AAPL,abc,101,1,LONG\n";
        assert!(matches!(
            trades_from_csv(input.as_bytes()),
            Err(JournalError::InvalidRecord { line: 2, .. })
        ));
    }
}
