use crate::enums::{Mood, TradeType};
use crate::error::CoreError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The label used for trades recorded without a strategy.
pub const UNLABELED_STRATEGY: &str = "Unlabeled";

/// One executed round-trip trade.
///
/// `pnl` and `roi` are never stored; they are derived from the price, size and
/// direction fields on every call so they cannot drift from their inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDateTime,
    pub symbol: String,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub position_size: Decimal,
    pub trade_type: TradeType,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
}

impl Trade {
    /// Profit or loss in currency units. Saturates at the `Decimal` bounds.
    pub fn pnl(&self) -> Decimal {
        let move_per_unit = match self.trade_type {
            TradeType::Long => self.exit_price.saturating_sub(self.entry_price),
            TradeType::Short => self.entry_price.saturating_sub(self.exit_price),
        };
        move_per_unit.saturating_mul(self.position_size)
    }

    /// Capital committed at entry.
    pub fn investment(&self) -> Decimal {
        self.entry_price.saturating_mul(self.position_size)
    }

    /// Return on the committed capital, in percent. Zero when nothing was committed.
    pub fn roi(&self) -> Decimal {
        let investment = self.investment();
        if investment.is_zero() {
            return Decimal::ZERO;
        }
        self.pnl()
            .checked_div(investment)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }

    /// The strategy this trade is grouped under, falling back to [`UNLABELED_STRATEGY`].
    pub fn strategy_label(&self) -> &str {
        self.strategy.as_deref().unwrap_or(UNLABELED_STRATEGY)
    }
}

/// A free-text reflection, stamped by the store when it is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDateTime,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    #[serde(default)]
    pub lessons_learned: Option<String>,
}

impl JournalEntry {
    pub fn from_draft(draft: JournalDraft, date: NaiveDateTime) -> Self {
        Self {
            date,
            title: draft.title,
            content: draft.content,
            mood: draft.mood,
            lessons_learned: draft.lessons_learned,
        }
    }
}

/// The raw fields of a trade as a user submits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDraft {
    /// Execution time. When absent the caller's "now" is used.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    pub symbol: String,
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub position_size: Decimal,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
}

impl TradeDraft {
    /// Validates the submitted fields and builds a [`Trade`].
    ///
    /// The symbol is trimmed and upper-cased. A stop-loss or take-profit of zero
    /// means "not set". Blank notes and strategy labels become `None`.
    pub fn into_trade(self, now: NaiveDateTime) -> Result<Trade, CoreError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::MissingField("symbol".to_string()));
        }
        if self.entry_price <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "entry_price".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if self.position_size <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "position_size".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if self.exit_price < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "exit_price".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let notional = self.entry_price.max(self.exit_price);
        if notional.checked_mul(self.position_size).is_none() {
            return Err(CoreError::InvalidInput(
                "position_size".to_string(),
                "price times size exceeds the supported range".to_string(),
            ));
        }

        Ok(Trade {
            date: self.date.unwrap_or(now),
            symbol,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            position_size: self.position_size,
            trade_type: self.trade_type,
            stop_loss: optional_level("stop_loss", self.stop_loss)?,
            take_profit: optional_level("take_profit", self.take_profit)?,
            notes: non_blank(self.notes),
            strategy: non_blank(self.strategy),
        })
    }
}

/// The fields of a journal entry as a user submits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalDraft {
    pub title: String,
    pub content: String,
    pub mood: Mood,
    #[serde(default)]
    pub lessons_learned: Option<String>,
}

impl JournalDraft {
    /// Title and content are required; blank lessons become `None`.
    pub fn validated(self) -> Result<Self, CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::MissingField("title".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(CoreError::MissingField("content".to_string()));
        }
        Ok(Self {
            lessons_learned: non_blank(self.lessons_learned),
            ..self
        })
    }
}

fn optional_level(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>, CoreError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(CoreError::InvalidInput(
            field.to_string(),
            "must not be negative".to_string(),
        )),
        Some(v) if v.is_zero() => Ok(None),
        other => Ok(other),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn trade(trade_type: TradeType, entry: Decimal, exit: Decimal, size: Decimal) -> Trade {
        Trade {
            date: at(10),
            symbol: "AAPL".to_string(),
            entry_price: entry,
            exit_price: exit,
            position_size: size,
            trade_type,
            stop_loss: None,
            take_profit: None,
            notes: None,
            strategy: None,
        }
    }

    fn draft() -> TradeDraft {
        TradeDraft {
            date: None,
            symbol: " msft ".to_string(),
            trade_type: TradeType::Long,
            entry_price: dec!(100),
            exit_price: dec!(105),
            position_size: dec!(2),
            stop_loss: Some(dec!(0)),
            take_profit: Some(dec!(110)),
            notes: Some("   ".to_string()),
            strategy: Some("Breakout".to_string()),
        }
    }

    #[test]
    fn long_and_short_pnl() {
        let long = trade(TradeType::Long, dec!(100), dec!(110), dec!(10));
        assert_eq!(long.pnl(), dec!(100));
        assert_eq!(long.roi(), dec!(10));

        let short = trade(TradeType::Short, dec!(50), dec!(40), dec!(5));
        assert_eq!(short.pnl(), dec!(50));
        assert_eq!(short.roi(), dec!(20));
    }

    #[test]
    fn roi_is_zero_without_committed_capital() {
        let t = trade(TradeType::Long, dec!(0), dec!(10), dec!(5));
        assert_eq!(t.pnl(), dec!(50));
        assert_eq!(t.roi(), Decimal::ZERO);
    }

    #[test]
    fn derived_fields_follow_source_fields() {
        let mut t = trade(TradeType::Long, dec!(100), dec!(110), dec!(1));
        assert_eq!(t.pnl(), dec!(10));
        t.exit_price = dec!(90);
        assert_eq!(t.pnl(), dec!(-10));
    }

    #[test]
    fn pnl_saturates_instead_of_overflowing() {
        let t = trade(TradeType::Long, dec!(1), Decimal::MAX, Decimal::MAX);
        assert_eq!(t.pnl(), Decimal::MAX);
        assert_eq!(t.investment(), Decimal::MAX);

        let short = trade(TradeType::Short, dec!(1), Decimal::MAX, dec!(2));
        assert_eq!(short.pnl(), Decimal::MIN);
    }

    #[test]
    fn unlabeled_strategy_fallback() {
        let mut t = trade(TradeType::Long, dec!(1), dec!(2), dec!(1));
        assert_eq!(t.strategy_label(), UNLABELED_STRATEGY);
        t.strategy = Some("Reversal".to_string());
        assert_eq!(t.strategy_label(), "Reversal");
    }

    #[test]
    fn draft_normalizes_fields() {
        let t = draft().into_trade(at(9)).unwrap();
        assert_eq!(t.symbol, "MSFT");
        assert_eq!(t.date, at(9));
        assert_eq!(t.stop_loss, None);
        assert_eq!(t.take_profit, Some(dec!(110)));
        assert_eq!(t.notes, None);
        assert_eq!(t.strategy.as_deref(), Some("Breakout"));
    }

    #[test]
    fn draft_rejects_bad_input() {
        let mut d = draft();
        d.symbol = "  ".to_string();
        assert_eq!(
            d.into_trade(at(9)),
            Err(CoreError::MissingField("symbol".to_string()))
        );

        let mut d = draft();
        d.entry_price = dec!(0);
        assert!(d.into_trade(at(9)).is_err());

        let mut d = draft();
        d.position_size = dec!(-1);
        assert!(d.into_trade(at(9)).is_err());

        let mut d = draft();
        d.stop_loss = Some(dec!(-3));
        assert!(d.into_trade(at(9)).is_err());

        let mut d = draft();
        d.entry_price = Decimal::MAX;
        assert!(matches!(
            d.into_trade(at(9)),
            Err(CoreError::InvalidInput(field, _)) if field == "position_size"
        ));
    }

    #[test]
    fn journal_draft_requires_title_and_content() {
        let ok = JournalDraft {
            title: "Monday".to_string(),
            content: "Stuck to the plan".to_string(),
            mood: Mood::Positive,
            lessons_learned: Some(String::new()),
        }
        .validated()
        .unwrap();
        assert_eq!(ok.lessons_learned, None);

        let missing = JournalDraft {
            title: "Tuesday".to_string(),
            content: " ".to_string(),
            mood: Mood::Neutral,
            lessons_learned: None,
        };
        assert_eq!(
            missing.validated(),
            Err(CoreError::MissingField("content".to_string()))
        );
    }
}
