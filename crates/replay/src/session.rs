//! Recorded session format.

use dom_core::{BookLevel, BookSnapshot, Error, Result, SymbolInfo, TimestampMs};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_tick_size() -> f64 {
    0.00001
}

fn default_digits() -> u32 {
    5
}

/// Feed state at one evaluation point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedTick {
    /// Timestamp in milliseconds.
    pub ts_ms: TimestampMs,
    /// Reference price; `None` keeps the previous one.
    #[serde(default)]
    pub price: Option<f64>,
    /// Visible levels; `None` means the book was unavailable.
    #[serde(default)]
    pub levels: Option<Vec<BookLevel>>,
}

impl RecordedTick {
    /// Book for this tick, if one was recorded.
    pub fn snapshot(&self) -> Option<BookSnapshot> {
        self.levels.clone().map(BookSnapshot::new)
    }
}

/// A recorded sequence of ticks for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    /// Instrument identifier.
    pub symbol: String,
    #[serde(default = "default_tick_size")]
    pub tick_size: f64,
    #[serde(default = "default_digits")]
    pub digits: u32,
    /// Ticks in time order.
    pub ticks: Vec<RecordedTick>,
}

impl RecordedSession {
    /// Parse a session from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let session: RecordedSession = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    /// Load a session from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Symbol metadata to register with the replay feed.
    pub fn symbol_info(&self) -> SymbolInfo {
        SymbolInfo::new(self.symbol.clone(), self.tick_size, self.digits)
    }

    /// Time covered by the session (ms).
    pub fn duration_ms(&self) -> i64 {
        match (self.ticks.first(), self.ticks.last()) {
            (Some(first), Some(last)) => last.ts_ms - first.ts_ms,
            _ => 0,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::data("session symbol is empty"));
        }
        if let Some(pair) = self.ticks.windows(2).find(|w| w[1].ts_ms < w[0].ts_ms) {
            return Err(Error::data(format!(
                "ticks out of order: {} after {}",
                pair[1].ts_ms, pair[0].ts_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_core::BookSide;

    #[test]
    fn test_parse_session() {
        let json = r#"{
            "symbol": "BTCUSD",
            "tick_size": 0.5,
            "ticks": [
                { "ts_ms": 1000, "price": 50000.0,
                  "levels": [ { "side": "Bid", "price": 50000.0, "volume": 1.5 } ] },
                { "ts_ms": 2000 }
            ]
        }"#;

        let session = RecordedSession::from_json_str(json).unwrap();

        assert_eq!(session.symbol, "BTCUSD");
        assert_eq!(session.digits, 5);
        assert_eq!(session.duration_ms(), 1000);
        let first = session.ticks[0].snapshot().unwrap();
        assert_eq!(first.levels[0].side, BookSide::Bid);
        assert!(session.ticks[1].snapshot().is_none());
        assert!(session.ticks[1].price.is_none());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let json = r#"{ "symbol": "EURUSD", "ticks": [ { "ts_ms": 2000 }, { "ts_ms": 1000 } ] }"#;
        let err = RecordedSession::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let json = r#"{ "symbol": " ", "ticks": [] }"#;
        assert!(RecordedSession::from_json_str(json).is_err());
    }
}
