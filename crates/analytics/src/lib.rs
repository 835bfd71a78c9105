//! # Tradelog Analytics Engine
//!
//! This crate turns a trade log into descriptive statistics: win rate, profit
//! factor, drawdown, Sharpe ratio, the equity curve, time-of-day and
//! day-of-week breakdowns, daily volatility and per-strategy rollups.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   store or of how results are rendered. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` holds configuration only.
//!   Every method takes a snapshot of trades and returns a fresh result, so calling
//!   it twice on the same snapshot yields identical output.
//! - **No failure on thin data:** Empty logs and zero denominators resolve to
//!   zero-valued results. Only invalid parameters return an `AnalyticsError`.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The calculator.
//! - `MetricsSnapshot` and the other report structs in [`report`].
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{
    AnalyticsEngine, DEFAULT_RISK_FREE_RATE, DEFAULT_TRADING_DAYS_PER_YEAR, MAX_DISTRIBUTION_BINS,
};
pub use error::AnalyticsError;
pub use report::{
    DistributionBin, EquityPoint, HourlyPerformance, MetricsSnapshot, MonthlyPerformance,
    PatternStats, StrategyPerformance, SymbolPerformance, TradingPatterns, VolatilityReport,
    WeekdayPerformance,
};
