//! A session as the entry form and history page drive it: record, filter, export.

use chrono::{NaiveDate, NaiveDateTime};
use core_types::{TradeDraft, TradeType};
use journal::{CSV_HEADER, SortKey, TradeQuery, TradeStore};
use rust_decimal_macros::dec;

fn session_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 2)
        .unwrap()
        .and_hms_opt(15, 45, 0)
        .unwrap()
}

fn draft(symbol: &str, trade_type: TradeType, exit: rust_decimal::Decimal) -> TradeDraft {
    TradeDraft {
        date: None,
        symbol: symbol.to_string(),
        trade_type,
        entry_price: dec!(50),
        exit_price: exit,
        position_size: dec!(4),
        stop_loss: None,
        take_profit: Some(dec!(0)),
        notes: None,
        strategy: None,
    }
}

#[test]
fn recorded_trades_export_in_store_order() {
    let mut store = TradeStore::with_clock(session_clock);
    for d in [
        draft("nvda", TradeType::Long, dec!(55)),
        draft("amd", TradeType::Short, dec!(52)),
    ] {
        let trade = d.into_trade(store.now()).unwrap();
        store.add_trade(trade);
    }

    let csv = store.export_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert!(lines[1].starts_with("2024-09-02 15:45:00,NVDA,50,55,4,LONG,,,,20,"));
    assert!(lines[2].starts_with("2024-09-02 15:45:00,AMD,50,52,4,SHORT,,,,-8,"));
}

#[test]
fn export_then_import_into_a_new_session() {
    let mut first = TradeStore::with_clock(session_clock);
    let trade = draft("spy", TradeType::Long, dec!(49))
        .into_trade(session_clock())
        .unwrap();
    first.add_trade(trade);

    let mut second = TradeStore::new();
    let imported = second.import_csv(first.export_csv().unwrap().as_bytes()).unwrap();

    assert_eq!(imported, 1);
    assert_eq!(second.trades(), first.trades());
}

#[test]
fn history_view_filters_a_snapshot() {
    let mut store = TradeStore::with_clock(session_clock);
    for d in [
        draft("nvda", TradeType::Long, dec!(55)),
        draft("amd", TradeType::Short, dec!(52)),
        draft("nvda", TradeType::Long, dec!(45)),
    ] {
        store.add_trade(d.into_trade(session_clock()).unwrap());
    }

    let query = TradeQuery {
        symbol: Some("NVDA".to_string()),
        sort: Some(SortKey::PnlLowest),
        ..TradeQuery::default()
    };
    let view = query.apply(store.trades(), session_clock().date());

    assert_eq!(view.len(), 2);
    assert_eq!(view[0].pnl(), dec!(-20));
    // The snapshot itself is untouched.
    assert_eq!(store.trades()[0].pnl(), dec!(20));
}
