//! Raw book entry classification.
//!
//! Platform feeds distinguish resting limit orders from market-triggered
//! entries on each side. The analyzer only needs two buckets, so entries are
//! collapsed to bid/ask here.

use dom_core::{BookLevel, BookSide, BookSnapshot, Size};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Entry type as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookEntryKind {
    /// Resting sell limit order.
    Sell,
    /// Resting buy limit order.
    Buy,
    /// Sell order triggered at market.
    SellMarket,
    /// Buy order triggered at market.
    BuyMarket,
}

impl BookEntryKind {
    /// Book side this entry belongs to.
    #[inline]
    pub fn side(self) -> BookSide {
        match self {
            BookEntryKind::Buy | BookEntryKind::BuyMarket => BookSide::Bid,
            BookEntryKind::Sell | BookEntryKind::SellMarket => BookSide::Ask,
        }
    }

    #[inline]
    pub fn is_market(self) -> bool {
        matches!(self, BookEntryKind::BuyMarket | BookEntryKind::SellMarket)
    }
}

/// A single entry from the raw feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBookEntry {
    pub kind: BookEntryKind,
    pub price: f64,
    pub volume: Size,
}

impl RawBookEntry {
    pub fn new(kind: BookEntryKind, price: f64, volume: Size) -> Self {
        Self { kind, price, volume }
    }
}

/// Statistics about entry classification.
#[derive(Debug, Clone, Default)]
pub struct ClassificationStats {
    /// Total entries seen.
    pub total_entries: u64,
    /// Entries mapped to the bid side.
    pub bid_entries: u64,
    /// Entries mapped to the ask side.
    pub ask_entries: u64,
    /// Entries that were market-triggered (either side).
    pub market_entries: u64,
    /// Entries dropped for invalid volume.
    pub dropped_entries: u64,
    /// Bid volume kept.
    pub bid_volume: f64,
    /// Ask volume kept.
    pub ask_volume: f64,
}

impl ClassificationStats {
    /// Fraction of kept entries that were market-triggered.
    pub fn market_frac(&self) -> f64 {
        let kept = self.bid_entries + self.ask_entries;
        if kept > 0 {
            self.market_entries as f64 / kept as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Collapses raw feed entries into two-sided book levels.
#[derive(Debug, Default)]
pub struct BookClassifier {
    stats: ClassificationStats,
}

impl BookClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a single entry.
    ///
    /// Entries with negative or non-finite volume are dropped.
    pub fn classify(&mut self, entry: &RawBookEntry) -> Option<BookLevel> {
        self.stats.total_entries += 1;

        let level = BookLevel {
            side: entry.kind.side(),
            price: entry.price,
            volume: entry.volume,
        };
        if !level.has_valid_volume() {
            self.stats.dropped_entries += 1;
            trace!(price = entry.price, volume = entry.volume, "dropping book entry");
            return None;
        }

        match level.side {
            BookSide::Bid => {
                self.stats.bid_entries += 1;
                self.stats.bid_volume += level.volume;
            }
            BookSide::Ask => {
                self.stats.ask_entries += 1;
                self.stats.ask_volume += level.volume;
            }
        }
        if entry.kind.is_market() {
            self.stats.market_entries += 1;
        }

        Some(level)
    }

    /// Classify a full feed book into a snapshot, preserving entry order.
    pub fn classify_book(&mut self, entries: &[RawBookEntry]) -> BookSnapshot {
        entries.iter().filter_map(|e| self.classify(e)).collect()
    }

    /// Get classification statistics.
    pub fn stats(&self) -> &ClassificationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_market_entries_collapse_to_side() {
        assert_eq!(BookEntryKind::BuyMarket.side(), BookSide::Bid);
        assert_eq!(BookEntryKind::SellMarket.side(), BookSide::Ask);
        assert!(BookEntryKind::SellMarket.is_market());
        assert!(!BookEntryKind::Buy.is_market());
    }

    #[test]
    fn test_classify_book() {
        let mut classifier = BookClassifier::new();
        let entries = [
            RawBookEntry::new(BookEntryKind::Sell, 1.1002, 5.0),
            RawBookEntry::new(BookEntryKind::SellMarket, 1.1001, 2.0),
            RawBookEntry::new(BookEntryKind::BuyMarket, 1.1000, 3.0),
            RawBookEntry::new(BookEntryKind::Buy, 1.0999, 7.0),
        ];

        let snapshot = classifier.classify_book(&entries);

        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.levels[1].side, BookSide::Ask);
        assert_eq!(snapshot.levels[2].side, BookSide::Bid);
        assert_relative_eq!(snapshot.side_volume(BookSide::Bid), 10.0);
        assert_relative_eq!(snapshot.side_volume(BookSide::Ask), 7.0);

        let stats = classifier.stats();
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.market_entries, 2);
        assert_relative_eq!(stats.market_frac(), 0.5);
    }

    #[test]
    fn test_invalid_volume_dropped() {
        let mut classifier = BookClassifier::new();
        let entries = [
            RawBookEntry::new(BookEntryKind::Buy, 1.0, -1.0),
            RawBookEntry::new(BookEntryKind::Buy, 1.0, f64::NAN),
            RawBookEntry::new(BookEntryKind::Sell, 1.1, 0.0),
        ];

        let snapshot = classifier.classify_book(&entries);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(classifier.stats().dropped_entries, 2);
        assert_relative_eq!(classifier.stats().ask_volume, 0.0);

        classifier.reset_stats();
        assert_eq!(classifier.stats().total_entries, 0);
    }
}
