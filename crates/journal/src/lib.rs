//! # Tradelog Journal Crate
//!
//! This crate is the session's record keeper. It holds the trades and journal
//! entries a user enters during one session and turns them into exportable text.
//!
//! ## Architectural Principles
//!
//! - **Explicit ownership:** A `TradeStore` is created per session and passed by
//!   reference. There is no global or ambient store.
//! - **In memory only:** Nothing is persisted. Export and import are the only
//!   ways data leaves or enters a session in bulk.
//! - **Derived on read:** `pnl` and `roi` are computed from each `Trade` whenever
//!   they are exported; the store never caches them.
//!
//! ## Public API
//!
//! - `TradeStore`: The append-only session store.
//! - `TradeQuery`, `SortKey`, `DatePreset`: Filters applied to a store snapshot.
//! - `trades_to_csv` / `trades_from_csv`: The CSV encoding of a trade log.
//! - `JournalError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod export;
pub mod query;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use error::JournalError;
pub use export::{CSV_HEADER, trades_from_csv, trades_to_csv};
pub use query::{DatePreset, SortKey, TradeQuery, distinct_strategies, distinct_symbols, sort_trades};
pub use store::{Clock, TradeStore, local_now};
