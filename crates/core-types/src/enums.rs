use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a round-trip trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Long,
    Short,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Long => "LONG",
            TradeType::Short => "SHORT",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(TradeType::Long),
            "SHORT" => Ok(TradeType::Short),
            other => Err(CoreError::InvalidInput(
                "trade_type".to_string(),
                format!("expected LONG or SHORT, got '{other}'"),
            )),
        }
    }
}

/// How the trader felt when writing a journal entry.
///
/// Variants are declared from most negative to most positive so the derived
/// `Ord` matches the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::VeryNegative,
        Mood::Negative,
        Mood::Neutral,
        Mood::Positive,
        Mood::VeryPositive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::VeryNegative => "Very Negative",
            Mood::Negative => "Negative",
            Mood::Neutral => "Neutral",
            Mood::Positive => "Positive",
            Mood::VeryPositive => "Very Positive",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::InvalidInput("mood".to_string(), format!("unknown mood '{wanted}'")))
    }
}
