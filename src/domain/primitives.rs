//! Domain primitives: Scrip, RowId, Action, Term.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Security symbol (e.g., "TCS", "INFY").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scrip(pub String);

impl Scrip {
    pub fn new(scrip: impl Into<String>) -> Self {
        Scrip(scrip.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable 1-based identifier of a row in the uploaded transaction sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl RowId {
    pub fn new(id: u64) -> Self {
        RowId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
}

impl FromStr for Action {
    type Err = String;

    /// Accepts `BUY`/`SELL` in any case, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

/// Holding-period classification of a realized gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Held for fewer than the long-term threshold days.
    #[serde(rename = "ST")]
    ShortTerm,
    /// Held for at least the long-term threshold days.
    #[serde(rename = "LT")]
    LongTerm,
}

impl Term {
    /// Classify a holding period. The threshold itself counts as long-term.
    pub fn classify(holding_days: i64, long_term_threshold_days: i64) -> Self {
        if holding_days < long_term_threshold_days {
            Term::ShortTerm
        } else {
            Term::LongTerm
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Term::ShortTerm => "ST",
            Term::LongTerm => "LT",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
