use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The headline metrics of a trade log.
///
/// This struct is the main output of the `AnalyticsEngine`. Every field is
/// always present; an empty trade log produces the all-zero snapshot returned
/// by [`MetricsSnapshot::new`]. Decimal fields are rounded to two places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_trades: usize,
    pub win_rate: Decimal,
    pub profit_factor: Decimal,
    pub avg_profit: Decimal,
    pub max_drawdown: Decimal,
    pub risk_reward_ratio: Decimal,
    pub max_profit: Decimal,
    pub max_loss: Decimal,
    pub sharpe_ratio: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub total_pnl: Decimal,
}

impl MetricsSnapshot {
    /// Metric names in display order.
    pub const KEYS: [&'static str; 12] = [
        "total_trades",
        "win_rate",
        "profit_factor",
        "avg_profit",
        "max_drawdown",
        "risk_reward_ratio",
        "max_profit",
        "max_loss",
        "sharpe_ratio",
        "avg_win",
        "avg_loss",
        "total_pnl",
    ];

    /// Creates a new, zeroed-out snapshot.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            win_rate: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            avg_profit: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            risk_reward_ratio: Decimal::ZERO,
            max_profit: Decimal::ZERO,
            max_loss: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
        }
    }

    /// Looks a metric up by name. Returns `None` only for unknown names.
    pub fn get(&self, key: &str) -> Option<Decimal> {
        let value = match key {
            "total_trades" => Decimal::from(self.total_trades),
            "win_rate" => self.win_rate,
            "profit_factor" => self.profit_factor,
            "avg_profit" => self.avg_profit,
            "max_drawdown" => self.max_drawdown,
            "risk_reward_ratio" => self.risk_reward_ratio,
            "max_profit" => self.max_profit,
            "max_loss" => self.max_loss,
            "sharpe_ratio" => self.sharpe_ratio,
            "avg_win" => self.avg_win,
            "avg_loss" => self.avg_loss,
            "total_pnl" => self.total_pnl,
            _ => return None,
        };
        Some(value)
    }

    /// Every metric as a `(name, value)` pair, in [`Self::KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, Decimal)> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// One point of the cumulative P&L curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDateTime,
    pub cumulative_pnl: Decimal,
}

/// Aggregate P&L of one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStats {
    pub mean_pnl: Decimal,
    pub total_pnl: Decimal,
    pub trade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyPerformance {
    pub hour: u32,
    #[serde(flatten)]
    pub stats: PatternStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayPerformance {
    /// Full English weekday name, e.g. "Monday".
    pub day_of_week: String,
    #[serde(flatten)]
    pub stats: PatternStats,
}

/// Time-of-day and day-of-week breakdown. Buckets without trades are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPatterns {
    /// Sorted by hour, 0 to 23.
    pub hourly: Vec<HourlyPerformance>,
    /// Sorted Monday to Sunday.
    pub daily: Vec<WeekdayPerformance>,
}

/// Dispersion of daily P&L. All zero for an empty trade log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub daily_std: Decimal,
    /// 5th percentile of daily P&L.
    pub var_95: Decimal,
    /// 1st percentile of daily P&L.
    pub var_99: Decimal,
    pub worst_day: Decimal,
    pub best_day: Decimal,
}

/// Metrics for the trades of a single strategy label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub strategy: String,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPerformance {
    /// Calendar month formatted as `YYYY-MM`.
    pub month: String,
    pub total_pnl: Decimal,
    pub trade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPerformance {
    pub symbol: String,
    pub trades: usize,
    pub avg_profit: Decimal,
    pub total_profit: Decimal,
}

/// One bucket of the per-trade P&L histogram. `upper` is inclusive only for the last bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBin {
    pub lower: Decimal,
    pub upper: Decimal,
    pub count: usize,
}
