use analytics::{AnalyticsEngine, AnalyticsError, MAX_DISTRIBUTION_BINS};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::AnalyticsSettings;
use journal::TradeStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// One state, and so one `TradeStore`, exists per server process; it is the session.
pub struct AppState {
    pub store: RwLock<TradeStore>,
    pub engine: AnalyticsEngine,
    /// Histogram bucket count used when a request does not ask for one.
    pub distribution_bins: usize,
}

impl AppState {
    pub fn new(store: TradeStore, engine: AnalyticsEngine, distribution_bins: usize) -> Self {
        Self {
            store: RwLock::new(store),
            engine,
            distribution_bins,
        }
    }

    /// Builds a fresh session from the analytics settings.
    pub fn from_settings(settings: &AnalyticsSettings) -> Result<Self, AnalyticsError> {
        if settings.distribution_bins > MAX_DISTRIBUTION_BINS {
            return Err(AnalyticsError::InvalidParameter(
                "distribution_bins".to_string(),
                format!("must be at most {MAX_DISTRIBUTION_BINS}"),
            ));
        }
        let engine =
            AnalyticsEngine::with_parameters(settings.risk_free_rate, settings.trading_days_per_year)?;
        Ok(Self::new(TradeStore::new(), engine, settings.distribution_bins))
    }
}

/// Defines every route of the API over the given session.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/trades",
            get(handlers::get_trades).post(handlers::create_trade),
        )
        .route("/api/trades/symbols", get(handlers::get_symbols))
        .route("/api/trades/strategies", get(handlers::get_strategies))
        .route("/api/trades/export.csv", get(handlers::export_trades_csv))
        .route("/api/trades/import", post(handlers::import_trades_csv))
        .route(
            "/api/journal",
            get(handlers::get_journal_entries).post(handlers::create_journal_entry),
        )
        .route("/api/session/export.json", get(handlers::export_session_json))
        .route("/api/analytics/metrics", get(handlers::get_metrics))
        .route("/api/analytics/equity-curve", get(handlers::get_equity_curve))
        .route("/api/analytics/patterns", get(handlers::get_trading_patterns))
        .route("/api/analytics/volatility", get(handlers::get_volatility))
        .route("/api/analytics/strategies", get(handlers::get_strategy_performance))
        .route("/api/analytics/monthly", get(handlers::get_monthly_performance))
        .route("/api/analytics/symbols", get(handlers::get_symbol_performance))
        .route("/api/analytics/distribution", get(handlers::get_pnl_distribution))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024 * 10)) // CSV imports up to 10MB
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    // Tracing is initialised by the binary before the server starts.
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
