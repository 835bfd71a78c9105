use crate::{AppState, error::AppError};
use analytics::{
    DistributionBin, EquityPoint, MetricsSnapshot, MonthlyPerformance, StrategyPerformance,
    SymbolPerformance, TradingPatterns, VolatilityReport,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use core_types::{JournalDraft, JournalEntry, Trade, TradeDraft};
use journal::{TradeQuery, distinct_strategies, distinct_symbols};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A trade as served to clients, with its derived figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeView {
    #[serde(flatten)]
    pub trade: Trade,
    pub pnl: Decimal,
    pub roi: Decimal,
}

impl From<Trade> for TradeView {
    fn from(trade: Trade) -> Self {
        Self {
            pnl: trade.pnl(),
            roi: trade.roi(),
            trade,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct DistributionParams {
    pub bins: Option<usize>,
}

/// Clones the matching trades out of the store so the lock is released before computing.
async fn snapshot(state: &AppState, query: &TradeQuery) -> Vec<Trade> {
    let store = state.store.read().await;
    query.apply(store.trades(), store.now().date())
}

/// # GET /api/trades
pub async fn get_trades(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<Vec<TradeView>> {
    let trades = snapshot(&state, &query).await;
    Json(trades.into_iter().map(TradeView::from).collect())
}

/// # POST /api/trades
pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TradeDraft>,
) -> Result<(StatusCode, Json<TradeView>), AppError> {
    let mut store = state.store.write().await;
    let trade = draft.into_trade(store.now())?;
    store.add_trade(trade.clone());
    Ok((StatusCode::CREATED, Json(trade.into())))
}

/// # GET /api/trades/symbols
/// Every symbol in the session, for history filters.
pub async fn get_symbols(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(distinct_symbols(state.store.read().await.trades()))
}

/// # GET /api/trades/strategies
/// Every strategy label in the session, "Unlabeled" included when any trade lacks one.
pub async fn get_strategies(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(distinct_strategies(state.store.read().await.trades()))
}

/// # GET /api/trades/export.csv
pub async fn export_trades_csv(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    let csv = store.export_csv()?;
    let disposition = format!(
        "attachment; filename=\"trades_{}.csv\"",
        store.now().format("%Y%m%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// # POST /api/trades/import
/// Accepts a CSV body in the export format. All rows are imported or none are.
pub async fn import_trades_csv(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    let mut store = state.store.write().await;
    let imported = store.import_csv(body.as_bytes())?;
    Ok(Json(ImportSummary {
        imported,
        total: store.len(),
    }))
}

/// # GET /api/journal
/// Newest entries first.
pub async fn get_journal_entries(State(state): State<Arc<AppState>>) -> Json<Vec<JournalEntry>> {
    let mut entries = state.store.read().await.journal_entries().to_vec();
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Json(entries)
}

/// # POST /api/journal
pub async fn create_journal_entry(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<JournalDraft>,
) -> Result<(StatusCode, Json<JournalEntry>), AppError> {
    let draft = draft.validated()?;
    let mut store = state.store.write().await;
    let entry = store.add_journal_entry(draft).clone();
    Ok((StatusCode::CREATED, Json(entry)))
}

/// # GET /api/session/export.json
pub async fn export_session_json(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let json = state.store.read().await.export_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

/// # GET /api/analytics/metrics
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<MetricsSnapshot> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.basic_metrics(&trades))
}

/// # GET /api/analytics/equity-curve
pub async fn get_equity_curve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<Vec<EquityPoint>> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.equity_curve(&trades))
}

/// # GET /api/analytics/patterns
pub async fn get_trading_patterns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<TradingPatterns> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.trading_patterns(&trades))
}

/// # GET /api/analytics/volatility
pub async fn get_volatility(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<VolatilityReport> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.volatility_metrics(&trades))
}

/// # GET /api/analytics/strategies
pub async fn get_strategy_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<Vec<StrategyPerformance>> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.strategy_performance(&trades))
}

/// # GET /api/analytics/monthly
pub async fn get_monthly_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<Vec<MonthlyPerformance>> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.monthly_performance(&trades))
}

/// # GET /api/analytics/symbols
pub async fn get_symbol_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<Vec<SymbolPerformance>> {
    let trades = snapshot(&state, &query).await;
    Json(state.engine.symbol_performance(&trades))
}

/// # GET /api/analytics/distribution?bins=N
/// Falls back to the configured bucket count when `bins` is absent.
pub async fn get_pnl_distribution(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
    Query(params): Query<DistributionParams>,
) -> Result<Json<Vec<DistributionBin>>, AppError> {
    let trades = snapshot(&state, &query).await;
    let bins = params.bins.unwrap_or(state.distribution_bins);
    Ok(Json(state.engine.pnl_distribution(&trades, bins)?))
}
