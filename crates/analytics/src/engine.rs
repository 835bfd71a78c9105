use crate::error::AnalyticsError;
use crate::report::{
    DistributionBin, EquityPoint, HourlyPerformance, MetricsSnapshot, MonthlyPerformance,
    PatternStats, StrategyPerformance, SymbolPerformance, TradingPatterns, VolatilityReport,
    WeekdayPerformance,
};
use crate::stats::{self, PnlSample, round2};
use chrono::{Datelike, Timelike, Weekday};
use core_types::Trade;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Annual risk-free rate used by the Sharpe ratio unless configured otherwise.
pub const DEFAULT_RISK_FREE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);
pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 252;
/// Upper bound on histogram buckets; the bucket vector is sized from caller input.
pub const MAX_DISTRIBUTION_BINS: usize = 1000;

/// A stateless calculator for deriving performance metrics from a trade log.
///
/// Every method is a pure function of the trade slice it receives. Trades are
/// ordered chronologically internally, so callers may pass filtered or
/// unsorted snapshots.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    risk_free_rate: Decimal,
    trading_days_per_year: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
        }
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom annual risk-free rate.
    pub fn with_parameters(
        risk_free_rate: Decimal,
        trading_days_per_year: u32,
    ) -> Result<Self, AnalyticsError> {
        if trading_days_per_year == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "trading_days_per_year".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            risk_free_rate,
            trading_days_per_year,
        })
    }

    /// Percentage of trades with a strictly positive P&L.
    pub fn win_rate(&self, trades: &[Trade]) -> Decimal {
        win_rate(&stats::chronological(trades))
    }

    /// Average win divided by the magnitude of the average loss.
    pub fn risk_reward_ratio(&self, trades: &[Trade]) -> Decimal {
        risk_reward_ratio(&stats::chronological(trades))
    }

    /// Gross profit divided by the magnitude of gross loss.
    pub fn profit_factor(&self, trades: &[Trade]) -> Decimal {
        profit_factor(&stats::chronological(trades))
    }

    /// Largest peak-to-trough decline of cumulative P&L, as a positive magnitude.
    pub fn max_drawdown(&self, trades: &[Trade]) -> Decimal {
        max_drawdown(&stats::chronological(trades))
    }

    /// Daily Sharpe ratio of the per-day summed P&L.
    pub fn sharpe_ratio(&self, trades: &[Trade]) -> Decimal {
        self.sharpe(&stats::chronological(trades))
    }

    /// The main entry point: every headline metric, rounded to two places.
    pub fn basic_metrics(&self, trades: &[Trade]) -> MetricsSnapshot {
        let samples = stats::chronological(trades);
        tracing::debug!(trades = samples.len(), "Calculating basic metrics.");
        self.metrics_for(&samples)
    }

    /// Cumulative P&L after each trade, in chronological order.
    pub fn equity_curve(&self, trades: &[Trade]) -> Vec<EquityPoint> {
        let mut cumulative = Decimal::ZERO;
        stats::chronological(trades)
            .into_iter()
            .map(|s| {
                cumulative = cumulative.saturating_add(s.pnl);
                EquityPoint {
                    date: s.date,
                    cumulative_pnl: cumulative,
                }
            })
            .collect()
    }

    /// P&L grouped by hour of day and by weekday.
    pub fn trading_patterns(&self, trades: &[Trade]) -> TradingPatterns {
        let mut by_hour: BTreeMap<u32, Vec<Decimal>> = BTreeMap::new();
        let mut by_weekday: BTreeMap<u32, (Weekday, Vec<Decimal>)> = BTreeMap::new();

        for trade in trades {
            let pnl = trade.pnl();
            by_hour.entry(trade.date.hour()).or_default().push(pnl);

            let weekday = trade.date.weekday();
            by_weekday
                .entry(weekday.num_days_from_monday())
                .or_insert_with(|| (weekday, Vec::new()))
                .1
                .push(pnl);
        }

        TradingPatterns {
            hourly: by_hour
                .into_iter()
                .map(|(hour, pnls)| HourlyPerformance {
                    hour,
                    stats: pattern_stats(&pnls),
                })
                .collect(),
            daily: by_weekday
                .into_values()
                .map(|(weekday, pnls)| WeekdayPerformance {
                    day_of_week: weekday_name(weekday).to_string(),
                    stats: pattern_stats(&pnls),
                })
                .collect(),
        }
    }

    /// Dispersion and tail statistics of daily P&L.
    pub fn volatility_metrics(&self, trades: &[Trade]) -> VolatilityReport {
        let daily = stats::daily_pnl(&stats::chronological(trades));
        if daily.is_empty() {
            return VolatilityReport::default();
        }

        VolatilityReport {
            daily_std: stats::sample_std_dev(&daily).unwrap_or(Decimal::ZERO),
            var_95: stats::quantile(&daily, Decimal::new(5, 2)).unwrap_or(Decimal::ZERO),
            var_99: stats::quantile(&daily, Decimal::new(1, 2)).unwrap_or(Decimal::ZERO),
            worst_day: daily.iter().copied().min().unwrap_or(Decimal::ZERO),
            best_day: daily.iter().copied().max().unwrap_or(Decimal::ZERO),
        }
    }

    /// Full metrics per strategy label, in the order labels first appear.
    pub fn strategy_performance(&self, trades: &[Trade]) -> Vec<StrategyPerformance> {
        let mut groups: Vec<(String, Vec<Trade>)> = Vec::new();
        for trade in trades {
            let label = trade.strategy_label();
            match groups.iter().position(|(name, _)| name == label) {
                Some(index) => groups[index].1.push(trade.clone()),
                None => groups.push((label.to_string(), vec![trade.clone()])),
            }
        }

        groups
            .into_iter()
            .map(|(strategy, members)| StrategyPerformance {
                metrics: self.metrics_for(&stats::chronological(&members)),
                strategy,
            })
            .collect()
    }

    /// Summed P&L per calendar month, oldest first.
    pub fn monthly_performance(&self, trades: &[Trade]) -> Vec<MonthlyPerformance> {
        let mut by_month: BTreeMap<(i32, u32), (Decimal, usize)> = BTreeMap::new();
        for trade in trades {
            let entry = by_month
                .entry((trade.date.year(), trade.date.month()))
                .or_insert((Decimal::ZERO, 0));
            entry.0 = entry.0.saturating_add(trade.pnl());
            entry.1 += 1;
        }

        by_month
            .into_iter()
            .map(|((year, month), (total_pnl, trade_count))| MonthlyPerformance {
                month: format!("{year:04}-{month:02}"),
                total_pnl: round2(total_pnl),
                trade_count,
            })
            .collect()
    }

    /// Trade count, average and total P&L per symbol, most profitable first.
    pub fn symbol_performance(&self, trades: &[Trade]) -> Vec<SymbolPerformance> {
        let mut by_symbol: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
        for trade in trades {
            by_symbol.entry(trade.symbol.as_str()).or_default().push(trade.pnl());
        }

        let mut rows: Vec<SymbolPerformance> = by_symbol
            .into_iter()
            .map(|(symbol, pnls)| SymbolPerformance {
                symbol: symbol.to_string(),
                trades: pnls.len(),
                avg_profit: round2(stats::mean(&pnls).unwrap_or(Decimal::ZERO)),
                total_profit: round2(stats::sum(pnls.iter().copied())),
            })
            .collect();
        // Stable sort keeps symbols with equal totals in alphabetical order.
        rows.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
        rows
    }

    /// Equal-width histogram of per-trade P&L.
    pub fn pnl_distribution(
        &self,
        trades: &[Trade],
        bins: usize,
    ) -> Result<Vec<DistributionBin>, AnalyticsError> {
        if bins == 0 || bins > MAX_DISTRIBUTION_BINS {
            return Err(AnalyticsError::InvalidParameter(
                "bins".to_string(),
                format!("must be between 1 and {MAX_DISTRIBUTION_BINS}"),
            ));
        }

        let pnls: Vec<Decimal> = trades.iter().map(Trade::pnl).collect();
        let (Some(min), Some(max)) = (pnls.iter().copied().min(), pnls.iter().copied().max())
        else {
            return Ok(Vec::new());
        };

        if min == max {
            return Ok(vec![DistributionBin {
                lower: min,
                upper: max,
                count: pnls.len(),
            }]);
        }

        let width = max.saturating_sub(min) / Decimal::from(bins);
        let mut counts = vec![0usize; bins];
        for pnl in &pnls {
            let index = (pnl.saturating_sub(min) / width)
                .floor()
                .to_usize()
                .unwrap_or(0)
                .min(bins - 1);
            counts[index] += 1;
        }

        Ok(counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| DistributionBin {
                lower: min + width * Decimal::from(i),
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * Decimal::from(i + 1)
                },
                count,
            })
            .collect())
    }

    fn metrics_for(&self, samples: &[PnlSample]) -> MetricsSnapshot {
        if samples.is_empty() {
            return MetricsSnapshot::new();
        }

        let pnls: Vec<Decimal> = samples.iter().map(|s| s.pnl).collect();
        let wins: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
        let losses: Vec<Decimal> = pnls.iter().copied().filter(|p| *p < Decimal::ZERO).collect();

        MetricsSnapshot {
            total_trades: samples.len(),
            win_rate: round2(win_rate(samples)),
            profit_factor: round2(profit_factor(samples)),
            avg_profit: round2(stats::mean(&pnls).unwrap_or(Decimal::ZERO)),
            max_drawdown: round2(max_drawdown(samples)),
            risk_reward_ratio: round2(risk_reward_ratio(samples)),
            max_profit: round2(pnls.iter().copied().max().unwrap_or(Decimal::ZERO)),
            max_loss: round2(pnls.iter().copied().min().unwrap_or(Decimal::ZERO)),
            sharpe_ratio: round2(self.sharpe(samples)),
            avg_win: round2(stats::mean(&wins).unwrap_or(Decimal::ZERO)),
            avg_loss: round2(stats::mean(&losses).unwrap_or(Decimal::ZERO)),
            total_pnl: round2(stats::sum(pnls)),
        }
    }

    fn sharpe(&self, samples: &[PnlSample]) -> Decimal {
        let daily = stats::daily_pnl(samples);
        let (Some(mean), Some(std_dev)) = (stats::mean(&daily), stats::sample_std_dev(&daily))
        else {
            return Decimal::ZERO;
        };
        if std_dev.is_zero() {
            return Decimal::ZERO;
        }

        let daily_risk_free = self.risk_free_rate / Decimal::from(self.trading_days_per_year);
        mean.saturating_sub(daily_risk_free)
            .checked_div(std_dev)
            .unwrap_or(Decimal::ZERO)
    }
}

fn win_rate(samples: &[PnlSample]) -> Decimal {
    if samples.is_empty() {
        return Decimal::ZERO;
    }
    let winners = samples.iter().filter(|s| s.pnl > Decimal::ZERO).count();
    Decimal::from(winners) / Decimal::from(samples.len()) * Decimal::ONE_HUNDRED
}

fn risk_reward_ratio(samples: &[PnlSample]) -> Decimal {
    let wins: Vec<Decimal> = samples.iter().map(|s| s.pnl).filter(|p| *p > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = samples.iter().map(|s| s.pnl).filter(|p| *p < Decimal::ZERO).collect();

    match (stats::mean(&wins), stats::mean(&losses)) {
        (Some(avg_win), Some(avg_loss)) => avg_win
            .checked_div(avg_loss.abs())
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn profit_factor(samples: &[PnlSample]) -> Decimal {
    let gross_profit = stats::sum(samples.iter().map(|s| s.pnl).filter(|p| *p > Decimal::ZERO));
    let gross_loss = stats::sum(samples.iter().map(|s| s.pnl).filter(|p| *p < Decimal::ZERO));

    if gross_loss.is_zero() {
        return Decimal::ZERO;
    }
    gross_profit
        .checked_div(gross_loss)
        .map_or(Decimal::ZERO, |ratio| ratio.abs())
}

/// Expects chronologically ordered samples.
fn max_drawdown(samples: &[PnlSample]) -> Decimal {
    let mut cumulative = Decimal::ZERO;
    let mut peak: Option<Decimal> = None;
    let mut worst = Decimal::ZERO;

    for sample in samples {
        cumulative = cumulative.saturating_add(sample.pnl);
        let running_max = peak.map_or(cumulative, |p| p.max(cumulative));
        peak = Some(running_max);
        worst = worst.min(cumulative.saturating_sub(running_max));
    }

    worst.abs()
}

fn pattern_stats(pnls: &[Decimal]) -> PatternStats {
    PatternStats {
        mean_pnl: round2(stats::mean(pnls).unwrap_or(Decimal::ZERO)),
        total_pnl: round2(stats::sum(pnls.iter().copied())),
        trade_count: pnls.len(),
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
