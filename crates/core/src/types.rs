//! Core data types for the dom-flow system.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Price type with ordering support.
pub type Price = OrderedFloat<f64>;

/// Size/quantity type.
pub type Size = f64;

/// Side of a resting order in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookSide {
    /// Resting buy order.
    Bid,
    /// Resting sell order.
    Ask,
}

impl BookSide {
    /// Get sign: +1 for bid, -1 for ask.
    pub fn sign(self) -> f64 {
        match self {
            BookSide::Bid => 1.0,
            BookSide::Ask => -1.0,
        }
    }
}

/// One visible resting order at a price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Side of the book.
    pub side: BookSide,
    /// Level price.
    pub price: f64,
    /// Resting volume (non-negative).
    pub volume: Size,
}

impl BookLevel {
    /// Create a bid level.
    pub fn bid(price: f64, volume: Size) -> Self {
        Self {
            side: BookSide::Bid,
            price,
            volume,
        }
    }

    /// Create an ask level.
    pub fn ask(price: f64, volume: Size) -> Self {
        Self {
            side: BookSide::Ask,
            price,
            volume,
        }
    }

    /// Volume is finite and non-negative.
    #[inline]
    pub fn has_valid_volume(&self) -> bool {
        self.volume.is_finite() && self.volume >= 0.0
    }
}

/// Visible book levels for one instrument at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub levels: Vec<BookLevel>,
}

impl BookSnapshot {
    /// Create a snapshot from a list of levels.
    pub fn new(levels: Vec<BookLevel>) -> Self {
        Self { levels }
    }

    /// Number of levels on both sides.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookLevel> {
        self.levels.iter()
    }

    /// Total resting volume across both sides.
    pub fn total_volume(&self) -> Size {
        self.levels.iter().map(|l| l.volume).sum()
    }

    /// Total resting volume on one side.
    pub fn side_volume(&self, side: BookSide) -> Size {
        self.levels
            .iter()
            .filter(|l| l.side == side)
            .map(|l| l.volume)
            .sum()
    }

    /// Mean volume per level, or `None` for an empty snapshot.
    pub fn average_volume(&self) -> Option<f64> {
        if self.levels.is_empty() {
            None
        } else {
            Some(self.total_volume() / self.levels.len() as f64)
        }
    }

    /// Highest bid price.
    pub fn best_bid(&self) -> Option<f64> {
        self.levels
            .iter()
            .filter(|l| l.side == BookSide::Bid)
            .map(|l| Price::from(l.price))
            .max()
            .map(|p| p.into_inner())
    }

    /// First level whose volume is negative or not finite.
    pub fn first_invalid_level(&self) -> Option<&BookLevel> {
        self.levels.iter().find(|l| !l.has_valid_volume())
    }
}

impl FromIterator<BookLevel> for BookSnapshot {
    fn from_iter<I: IntoIterator<Item = BookLevel>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

/// Symbol metadata resolved from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Instrument identifier (e.g., "EURUSD").
    pub symbol: String,
    /// Minimum price increment.
    pub tick_size: f64,
    /// Price digits.
    pub digits: u32,
}

impl SymbolInfo {
    pub fn new(symbol: impl Into<String>, tick_size: f64, digits: u32) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size,
            digits,
        }
    }
}

/// Instrument class used to pick the minimum book volume threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentClass {
    Crypto,
    Index,
    Forex,
}

/// Ordered classification table. First match wins.
const CLASS_PATTERNS: &[(InstrumentClass, &[&str])] = &[
    (InstrumentClass::Crypto, &["BTC", "ETH", "XRP"]),
    (InstrumentClass::Index, &["US30", "NAS100"]),
];

impl InstrumentClass {
    /// Classify an instrument by case-insensitive substring match.
    ///
    /// Anything not matched by the table falls back to `Forex`.
    pub fn classify(symbol: &str) -> Self {
        let upper = symbol.to_ascii_uppercase();
        CLASS_PATTERNS
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| upper.contains(p)))
            .map(|(class, _)| *class)
            .unwrap_or(InstrumentClass::Forex)
    }
}

/// Output of one order book analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Bid volume / ask volume (unbounded above).
    pub bid_ask_imbalance: f64,
    /// (bid - ask) / (bid + ask), in [-1, 1].
    pub order_book_pressure: f64,
    /// Total resting bid volume.
    pub total_bid_depth: Size,
    /// Total resting ask volume.
    pub total_ask_depth: Size,
    /// Bid levels above the strong-level threshold.
    pub strong_bid_levels: u32,
    /// Ask levels above the strong-level threshold.
    pub strong_ask_levels: u32,
    /// Absorption score in [0, 100], 50 = neutral.
    pub absorption_score: f64,
    /// Whether the feed returned a book on the last call.
    pub is_dom_available: bool,
    /// Data quality score in [0, 100].
    pub dom_confidence: f64,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            bid_ask_imbalance: 1.0,
            order_book_pressure: 0.0,
            total_bid_depth: 0.0,
            total_ask_depth: 0.0,
            strong_bid_levels: 0,
            strong_ask_levels: 0,
            absorption_score: 50.0,
            is_dom_available: false,
            dom_confidence: 0.0,
        }
    }
}

impl AnalysisResult {
    /// Total resting volume on both sides.
    #[inline]
    pub fn total_depth(&self) -> Size {
        self.total_bid_depth + self.total_ask_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_snapshot() -> BookSnapshot {
        BookSnapshot::new(vec![
            BookLevel::ask(1.1003, 30.0),
            BookLevel::ask(1.1002, 20.0),
            BookLevel::bid(1.1000, 40.0),
            BookLevel::bid(1.0999, 10.0),
        ])
    }

    #[test]
    fn test_snapshot_volumes() {
        let snap = sample_snapshot();
        assert_eq!(snap.len(), 4);
        assert_relative_eq!(snap.total_volume(), 100.0);
        assert_relative_eq!(snap.side_volume(BookSide::Bid), 50.0);
        assert_relative_eq!(snap.side_volume(BookSide::Ask), 50.0);
        assert_relative_eq!(snap.average_volume().unwrap(), 25.0);
    }

    #[test]
    fn test_empty_snapshot_has_no_average() {
        let snap = BookSnapshot::default();
        assert!(snap.is_empty());
        assert!(snap.average_volume().is_none());
        assert!(snap.best_bid().is_none());
    }

    #[test]
    fn test_best_bid() {
        let snap = sample_snapshot();
        assert_eq!(snap.best_bid(), Some(1.1000));
    }

    #[test]
    fn test_invalid_volumes() {
        assert!(BookLevel::bid(1.0, 0.0).has_valid_volume());
        assert!(!BookLevel::bid(1.0, -0.5).has_valid_volume());
        assert!(!BookLevel::ask(1.0, f64::NAN).has_valid_volume());
        assert!(!BookLevel::ask(1.0, f64::INFINITY).has_valid_volume());

        assert!(sample_snapshot().first_invalid_level().is_none());
        let snap = BookSnapshot::new(vec![
            BookLevel::bid(1.0, 10.0),
            BookLevel::ask(1.1, -15.0),
        ]);
        assert_eq!(snap.first_invalid_level(), Some(&BookLevel::ask(1.1, -15.0)));
    }

    #[test]
    fn test_classify_crypto_case_insensitive() {
        assert_eq!(InstrumentClass::classify("BTCUSD"), InstrumentClass::Crypto);
        assert_eq!(InstrumentClass::classify("btcusd"), InstrumentClass::Crypto);
        assert_eq!(InstrumentClass::classify("xrpeur"), InstrumentClass::Crypto);
    }

    #[test]
    fn test_classify_index_and_forex() {
        assert_eq!(InstrumentClass::classify("US30.cash"), InstrumentClass::Index);
        assert_eq!(InstrumentClass::classify("nas100"), InstrumentClass::Index);
        assert_eq!(InstrumentClass::classify("EURUSD"), InstrumentClass::Forex);
    }

    #[test]
    fn test_crypto_checked_before_index() {
        assert_eq!(InstrumentClass::classify("ETHUS30"), InstrumentClass::Crypto);
    }

    #[test]
    fn test_default_result_is_neutral() {
        let result = AnalysisResult::default();
        assert_eq!(result.bid_ask_imbalance, 1.0);
        assert_eq!(result.absorption_score, 50.0);
        assert!(!result.is_dom_available);
        assert_relative_eq!(result.total_depth(), 0.0);
    }
}
