//! Depth aggregation.
//!
//! Single pass over a book snapshot producing per-side totals and strong
//! level counts, plus the ratios derived from them.

use dom_core::{BookSide, BookSnapshot, Size};

/// Imbalance reported when the ask side is empty but bids are present.
pub const ONE_SIDED_IMBALANCE: f64 = 100.0;

/// Imbalance reported when both sides are empty.
pub const NEUTRAL_IMBALANCE: f64 = 1.0;

/// Bid volume over ask volume, with sentinels for an empty ask side.
#[inline]
pub fn imbalance_ratio(bid_volume: Size, ask_volume: Size) -> f64 {
    if ask_volume > 0.0 {
        bid_volume / ask_volume
    } else if bid_volume > 0.0 {
        ONE_SIDED_IMBALANCE
    } else {
        NEUTRAL_IMBALANCE
    }
}

/// Normalized net skew: (bid - ask) / (bid + ask), 0 for an empty book.
#[inline]
pub fn book_pressure(bid_volume: Size, ask_volume: Size) -> f64 {
    let total = bid_volume + ask_volume;
    if total > 0.0 {
        (bid_volume - ask_volume) / total
    } else {
        0.0
    }
}

/// Aggregated depth for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthSummary {
    /// Total bid volume.
    pub bid_volume: Size,
    /// Total ask volume.
    pub ask_volume: Size,
    /// Bid levels with volume above the strong threshold.
    pub strong_bid_levels: u32,
    /// Ask levels with volume above the strong threshold.
    pub strong_ask_levels: u32,
    /// Levels on both sides with a usable volume.
    pub level_count: usize,
}

impl DepthSummary {
    /// Aggregate a snapshot. A level is strong when its volume is strictly
    /// greater than `strong_threshold`.
    ///
    /// Levels with a negative or non-finite volume are skipped and not
    /// counted, so pressure stays within [-1, 1].
    pub fn from_snapshot(snapshot: &BookSnapshot, strong_threshold: f64) -> Self {
        let mut summary = Self::default();

        for level in snapshot.iter().filter(|l| l.has_valid_volume()) {
            summary.level_count += 1;
            let strong = level.volume > strong_threshold;
            match level.side {
                BookSide::Bid => {
                    summary.bid_volume += level.volume;
                    if strong {
                        summary.strong_bid_levels += 1;
                    }
                }
                BookSide::Ask => {
                    summary.ask_volume += level.volume;
                    if strong {
                        summary.strong_ask_levels += 1;
                    }
                }
            }
        }

        summary
    }

    #[inline]
    pub fn total_volume(&self) -> Size {
        self.bid_volume + self.ask_volume
    }

    #[inline]
    pub fn imbalance_ratio(&self) -> f64 {
        imbalance_ratio(self.bid_volume, self.ask_volume)
    }

    #[inline]
    pub fn pressure(&self) -> f64 {
        book_pressure(self.bid_volume, self.ask_volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dom_core::BookLevel;

    fn scenario_a() -> BookSnapshot {
        BookSnapshot::new(vec![
            BookLevel::bid(99.0, 100.0),
            BookLevel::bid(98.0, 100.0),
            BookLevel::bid(97.0, 100.0),
            BookLevel::bid(96.0, 100.0),
            BookLevel::bid(95.0, 100.0),
            BookLevel::ask(101.0, 60.0),
            BookLevel::ask(102.0, 40.0),
        ])
    }

    #[test]
    fn test_scenario_a_totals() {
        let summary = DepthSummary::from_snapshot(&scenario_a(), f64::MAX);

        assert_relative_eq!(summary.bid_volume, 500.0);
        assert_relative_eq!(summary.ask_volume, 100.0);
        assert_eq!(summary.level_count, 7);
        assert_relative_eq!(summary.imbalance_ratio(), 5.0);
        assert_relative_eq!(summary.pressure(), 400.0 / 600.0);
    }

    #[test]
    fn test_strong_levels_strictly_above_threshold() {
        let snapshot = BookSnapshot::new(vec![
            BookLevel::bid(1.0, 50.0),
            BookLevel::bid(0.9, 51.0),
            BookLevel::ask(1.1, 80.0),
            BookLevel::ask(1.2, 10.0),
        ]);

        let summary = DepthSummary::from_snapshot(&snapshot, 50.0);

        assert_eq!(summary.strong_bid_levels, 1);
        assert_eq!(summary.strong_ask_levels, 1);
    }

    #[test]
    fn test_imbalance_sentinels() {
        assert_eq!(imbalance_ratio(10.0, 0.0), ONE_SIDED_IMBALANCE);
        assert_eq!(imbalance_ratio(0.0, 0.0), NEUTRAL_IMBALANCE);
        assert_eq!(imbalance_ratio(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_imbalance_monotonic() {
        assert!(imbalance_ratio(20.0, 10.0) > imbalance_ratio(10.0, 10.0));
        assert!(imbalance_ratio(10.0, 20.0) < imbalance_ratio(10.0, 10.0));
    }

    #[test]
    fn test_pressure_bounds() {
        assert_eq!(book_pressure(0.0, 0.0), 0.0);
        assert_eq!(book_pressure(7.0, 7.0), 0.0);
        assert_eq!(book_pressure(10.0, 0.0), 1.0);
        assert_eq!(book_pressure(0.0, 10.0), -1.0);

        for (bid, ask) in [(1.0, 1e9), (1e9, 1.0), (3.5, 2.25), (0.001, 0.0)] {
            let p = book_pressure(bid, ask);
            assert!((-1.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_invalid_volumes_skipped() {
        let snapshot = BookSnapshot::new(vec![
            BookLevel::bid(99.0, 10.0),
            BookLevel::bid(98.0, 10.0),
            BookLevel::ask(101.0, -15.0),
            BookLevel::ask(102.0, 10.0),
            BookLevel::ask(103.0, f64::NAN),
            BookLevel::bid(97.0, f64::INFINITY),
        ]);

        let summary = DepthSummary::from_snapshot(&snapshot, 5.0);

        assert_eq!(summary.level_count, 3);
        assert_relative_eq!(summary.bid_volume, 20.0);
        assert_relative_eq!(summary.ask_volume, 10.0);
        assert_eq!(summary.strong_bid_levels, 2);
        assert_eq!(summary.strong_ask_levels, 1);
        assert_relative_eq!(summary.imbalance_ratio(), 2.0);
        let pressure = summary.pressure();
        assert!((-1.0..=1.0).contains(&pressure));
        assert_relative_eq!(pressure, 10.0 / 30.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let summary = DepthSummary::from_snapshot(&BookSnapshot::default(), 1.0);
        assert_eq!(summary, DepthSummary::default());
        assert_eq!(summary.pressure(), 0.0);
        assert_eq!(summary.imbalance_ratio(), NEUTRAL_IMBALANCE);
    }
}
