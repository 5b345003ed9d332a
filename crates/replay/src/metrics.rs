//! Replay summary statistics.

use crate::runner::{TickOutcome, TickStatus};
use dom_features::absorption::{BEARISH_BASE, BULLISH_BASE};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Aggregate view of a replayed session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    /// Ticks replayed.
    pub total_ticks: u32,
    /// Ticks with a full analysis.
    pub analyzed_ticks: u32,
    /// Ticks where the book was missing or empty.
    pub unavailable_ticks: u32,
    /// Ticks where the book was too shallow.
    pub insufficient_ticks: u32,
    /// Fraction of ticks with a full analysis.
    pub analyzed_frac: f64,
    /// Mean confidence over analyzed ticks.
    pub mean_confidence: f64,
    /// Mean pressure over analyzed ticks.
    pub mean_pressure: f64,
    /// Sample standard deviation of pressure.
    pub pressure_std_dev: f64,
    /// Mean imbalance ratio over analyzed ticks.
    pub mean_imbalance: f64,
    /// Mean resting volume (both sides) over analyzed ticks.
    pub mean_total_depth: f64,
    /// Analyzed ticks in the bullish absorption band.
    pub bullish_ticks: u32,
    /// Analyzed ticks in the bearish absorption band.
    pub bearish_ticks: u32,
    /// Most strong bid levels seen on one tick.
    pub max_strong_bid_levels: u32,
    /// Most strong ask levels seen on one tick.
    pub max_strong_ask_levels: u32,
}

impl ReplaySummary {
    /// Summarize per-tick outcomes.
    pub fn from_outcomes(outcomes: &[TickOutcome]) -> Self {
        let mut summary = ReplaySummary {
            total_ticks: outcomes.len() as u32,
            ..Default::default()
        };

        let mut confidences = Vec::with_capacity(outcomes.len());
        let mut pressures = Vec::with_capacity(outcomes.len());
        let mut imbalances = Vec::with_capacity(outcomes.len());
        let mut depths = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            match outcome.status {
                TickStatus::Unavailable => summary.unavailable_ticks += 1,
                TickStatus::InsufficientDepth => summary.insufficient_ticks += 1,
                TickStatus::Analyzed => {
                    summary.analyzed_ticks += 1;
                    let result = &outcome.result;

                    confidences.push(result.dom_confidence);
                    pressures.push(result.order_book_pressure);
                    imbalances.push(result.bid_ask_imbalance);
                    depths.push(result.total_depth());

                    if result.absorption_score >= BULLISH_BASE {
                        summary.bullish_ticks += 1;
                    } else if result.absorption_score <= BEARISH_BASE {
                        summary.bearish_ticks += 1;
                    }

                    summary.max_strong_bid_levels =
                        summary.max_strong_bid_levels.max(result.strong_bid_levels);
                    summary.max_strong_ask_levels =
                        summary.max_strong_ask_levels.max(result.strong_ask_levels);
                }
            }
        }

        if summary.total_ticks > 0 {
            summary.analyzed_frac = summary.analyzed_ticks as f64 / summary.total_ticks as f64;
        }

        if !confidences.is_empty() {
            summary.mean_confidence = confidences.iter().mean();
            summary.mean_pressure = pressures.iter().mean();
            summary.mean_imbalance = imbalances.iter().mean();
            summary.mean_total_depth = depths.iter().mean();
        }

        // Sample std dev is undefined below two observations.
        if pressures.len() >= 2 {
            summary.pressure_std_dev = pressures.iter().std_dev();
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dom_core::AnalysisResult;

    fn analyzed(pressure: f64, absorption: f64, confidence: f64) -> TickOutcome {
        TickOutcome {
            ts_ms: 0,
            status: TickStatus::Analyzed,
            result: AnalysisResult {
                total_bid_depth: confidence,
                total_ask_depth: 10.0,
                order_book_pressure: pressure,
                absorption_score: absorption,
                dom_confidence: confidence,
                is_dom_available: true,
                ..Default::default()
            },
        }
    }

    fn failed(status: TickStatus) -> TickOutcome {
        TickOutcome {
            ts_ms: 0,
            status,
            result: AnalysisResult::default(),
        }
    }

    #[test]
    fn test_empty_outcomes() {
        let summary = ReplaySummary::from_outcomes(&[]);
        assert_eq!(summary.total_ticks, 0);
        assert_eq!(summary.mean_confidence, 0.0);
        assert_eq!(summary.analyzed_frac, 0.0);
    }

    #[test]
    fn test_counts_and_means() {
        let outcomes = vec![
            analyzed(0.5, 95.0, 40.0),
            analyzed(-0.5, 10.0, 20.0),
            analyzed(0.0, 50.0, 30.0),
            failed(TickStatus::Unavailable),
            failed(TickStatus::InsufficientDepth),
        ];

        let summary = ReplaySummary::from_outcomes(&outcomes);

        assert_eq!(summary.total_ticks, 5);
        assert_eq!(summary.analyzed_ticks, 3);
        assert_eq!(summary.unavailable_ticks, 1);
        assert_eq!(summary.insufficient_ticks, 1);
        assert_eq!(summary.bullish_ticks, 1);
        assert_eq!(summary.bearish_ticks, 1);
        assert_relative_eq!(summary.analyzed_frac, 0.6);
        assert_relative_eq!(summary.mean_confidence, 30.0);
        assert_relative_eq!(summary.mean_total_depth, 40.0);
        assert_relative_eq!(summary.mean_pressure, 0.0);
        // Sample std dev of [0.5, -0.5, 0.0] = 0.5
        assert_relative_eq!(summary.pressure_std_dev, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_tick_has_zero_std_dev() {
        let summary = ReplaySummary::from_outcomes(&[analyzed(0.3, 50.0, 20.0)]);
        assert_eq!(summary.pressure_std_dev, 0.0);
        assert_relative_eq!(summary.mean_pressure, 0.3);
    }
}
