//! Filtering and sorting of trade snapshots for history views.

use chrono::{Days, NaiveDate};
use core_types::{Trade, TradeType};
use serde::Deserialize;
use std::collections::BTreeSet;

/// A relative date window ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DatePreset {
    #[default]
    #[serde(rename = "all_time")]
    AllTime,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
}

impl DatePreset {
    fn days(&self) -> Option<u64> {
        match self {
            DatePreset::AllTime => None,
            DatePreset::Last7Days => Some(7),
            DatePreset::Last30Days => Some(30),
            DatePreset::Last90Days => Some(90),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    DateNewest,
    DateOldest,
    PnlHighest,
    PnlLowest,
    RoiHighest,
    RoiLowest,
}

/// Optional filters over a trade snapshot. Every unset field matches all trades.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TradeQuery {
    /// First calendar date to include.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last calendar date to include.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Supplies `from`/`to` when they are not given explicitly.
    #[serde(default)]
    pub preset: Option<DatePreset>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub trade_type: Option<TradeType>,
    /// Matches [`Trade::strategy_label`], so "Unlabeled" selects trades without one.
    #[serde(default)]
    pub strategy: Option<String>,
    /// Store order is kept when unset.
    #[serde(default)]
    pub sort: Option<SortKey>,
}

impl TradeQuery {
    /// Returns the matching trades, sorted when a sort key is set.
    ///
    /// `today` anchors the relative presets.
    pub fn apply(&self, trades: &[Trade], today: NaiveDate) -> Vec<Trade> {
        let (from, to) = self.date_bounds(today);

        let mut selected: Vec<Trade> = trades
            .iter()
            .filter(|t| from.is_none_or(|d| t.date.date() >= d))
            .filter(|t| to.is_none_or(|d| t.date.date() <= d))
            .filter(|t| {
                self.symbol
                    .as_deref()
                    .is_none_or(|s| t.symbol.eq_ignore_ascii_case(s.trim()))
            })
            .filter(|t| self.trade_type.is_none_or(|tt| t.trade_type == tt))
            .filter(|t| self.strategy.as_deref().is_none_or(|s| t.strategy_label() == s))
            .cloned()
            .collect();

        if let Some(sort) = self.sort {
            sort_trades(&mut selected, sort);
        }
        selected
    }

    fn date_bounds(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let preset_from = self
            .preset
            .and_then(|p| p.days())
            .and_then(|days| today.checked_sub_days(Days::new(days)));
        let preset_to = preset_from.map(|_| today);

        (self.from.or(preset_from), self.to.or(preset_to))
    }
}

/// Stable sort, so equal keys keep store order.
pub fn sort_trades(trades: &mut [Trade], key: SortKey) {
    match key {
        SortKey::DateNewest => trades.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::DateOldest => trades.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::PnlHighest => trades.sort_by(|a, b| b.pnl().cmp(&a.pnl())),
        SortKey::PnlLowest => trades.sort_by(|a, b| a.pnl().cmp(&b.pnl())),
        SortKey::RoiHighest => trades.sort_by(|a, b| b.roi().cmp(&a.roi())),
        SortKey::RoiLowest => trades.sort_by(|a, b| a.roi().cmp(&b.roi())),
    }
}

/// Sorted, de-duplicated symbols for filter pickers.
pub fn distinct_symbols(trades: &[Trade]) -> Vec<String> {
    trades
        .iter()
        .map(|t| t.symbol.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, de-duplicated strategy labels, including "Unlabeled" when present.
pub fn distinct_strategies(trades: &[Trade]) -> Vec<String> {
    trades
        .iter()
        .map(|t| t.strategy_label().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    fn trade(day: u32, symbol: &str, trade_type: TradeType, exit: Decimal) -> Trade {
        Trade {
            date: at(day),
            symbol: symbol.to_string(),
            entry_price: dec!(10),
            exit_price: exit,
            position_size: dec!(1),
            trade_type,
            stop_loss: None,
            take_profit: None,
            notes: None,
            strategy: None,
        }
    }

    fn log() -> Vec<Trade> {
        let mut breakout = trade(20, "MSFT", TradeType::Long, dec!(15));
        breakout.strategy = Some("Breakout".to_string());
        vec![
            trade(1, "AAPL", TradeType::Long, dec!(12)),
            trade(10, "MSFT", TradeType::Short, dec!(11)),
            breakout,
            trade(28, "AAPL", TradeType::Short, dec!(5)),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn empty_query_keeps_store_order() {
        let trades = log();
        assert_eq!(TradeQuery::default().apply(&trades, today()), trades);
    }

    #[test]
    fn filters_combine() {
        let query = TradeQuery {
            symbol: Some("aapl".to_string()),
            trade_type: Some(TradeType::Short),
            ..TradeQuery::default()
        };
        let selected = query.apply(&log(), today());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, at(28));
    }

    #[test]
    fn date_range_is_inclusive() {
        let query = TradeQuery {
            from: NaiveDate::from_ymd_opt(2024, 6, 10),
            to: NaiveDate::from_ymd_opt(2024, 6, 20),
            ..TradeQuery::default()
        };
        let days: Vec<NaiveDateTime> = query.apply(&log(), today()).iter().map(|t| t.date).collect();
        assert_eq!(days, vec![at(10), at(20)]);
    }

    #[test]
    fn preset_resolves_against_today() {
        let query = TradeQuery {
            preset: Some(DatePreset::Last7Days),
            ..TradeQuery::default()
        };
        let selected = query.apply(&log(), today());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, at(28));
    }

    #[test]
    fn strategy_filter_matches_unlabeled() {
        let query = TradeQuery {
            strategy: Some("Unlabeled".to_string()),
            ..TradeQuery::default()
        };
        assert_eq!(query.apply(&log(), today()).len(), 3);
    }

    #[test]
    fn sorts_by_pnl_and_date() {
        let query = TradeQuery {
            sort: Some(SortKey::PnlHighest),
            ..TradeQuery::default()
        };
        let pnls: Vec<Decimal> = query.apply(&log(), today()).iter().map(Trade::pnl).collect();
        assert_eq!(pnls, vec![dec!(5), dec!(5), dec!(2), dec!(-1)]);

        let mut trades = log();
        sort_trades(&mut trades, SortKey::DateNewest);
        assert_eq!(trades[0].date, at(28));
    }

    #[test]
    fn distinct_values_are_sorted() {
        assert_eq!(distinct_symbols(&log()), vec!["AAPL", "MSFT"]);
        assert_eq!(distinct_strategies(&log()), vec!["Breakout", "Unlabeled"]);
    }
}
