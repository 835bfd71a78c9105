use crate::error::JournalError;
use crate::export;
use chrono::{Local, NaiveDateTime};
use core_types::{JournalDraft, JournalEntry, Trade};
use std::io::Read;

/// Supplies the save time stamped on journal entries.
pub type Clock = fn() -> NaiveDateTime;

/// The local wall clock, without timezone.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// The `TradeStore` holds one session's trades and journal entries.
///
/// It is created once per session and handed by reference to whatever needs
/// it. Both collections are append-only and keep insertion order. The store
/// performs no validation; callers validate drafts before appending.
#[derive(Debug, Clone)]
pub struct TradeStore {
    trades: Vec<Trade>,
    journal_entries: Vec<JournalEntry>,
    clock: Clock,
}

impl Default for TradeStore {
    fn default() -> Self {
        Self::with_clock(local_now)
    }
}

impl TradeStore {
    /// Creates an empty store stamped by the local clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that reads save times from `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            trades: Vec::new(),
            journal_entries: Vec::new(),
            clock,
        }
    }

    /// The store's current time.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Appends a trade to the end of the log.
    pub fn add_trade(&mut self, trade: Trade) {
        tracing::debug!(symbol = %trade.symbol, trade_type = %trade.trade_type, "Trade recorded.");
        self.trades.push(trade);
    }

    /// Appends a journal entry, stamping it with the store's clock.
    pub fn add_journal_entry(&mut self, draft: JournalDraft) -> &JournalEntry {
        let entry = JournalEntry::from_draft(draft, self.now());
        tracing::debug!(title = %entry.title, mood = %entry.mood, "Journal entry saved.");
        self.journal_entries.push(entry);
        &self.journal_entries[self.journal_entries.len() - 1]
    }

    /// The trades in insertion order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// The journal entries in insertion order.
    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Drops every trade and journal entry, as when a session ends.
    pub fn clear(&mut self) {
        tracing::info!(
            trades = self.trades.len(),
            journal_entries = self.journal_entries.len(),
            "Session store cleared."
        );
        self.trades.clear();
        self.journal_entries.clear();
    }

    /// The trade log as CSV, in insertion order.
    pub fn export_csv(&self) -> Result<String, JournalError> {
        let csv = export::trades_to_csv(&self.trades)?;
        tracing::info!(trades = self.trades.len(), "Exported trade log to CSV.");
        Ok(csv)
    }

    /// Both collections as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, JournalError> {
        export::session_to_json(&self.trades, &self.journal_entries)
    }

    /// Appends every trade of a CSV log. Nothing is appended if any row is invalid.
    ///
    /// Returns the number of trades imported.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize, JournalError> {
        let imported = export::trades_from_csv(reader)?;
        let count = imported.len();
        self.trades.extend(imported);
        tracing::info!(imported = count, total = self.trades.len(), "Imported trades from CSV.");
        Ok(count)
    }
}
