//! Book data-quality scoring.

use dom_core::config::AnalyzerConfig;

/// Upper bound of the confidence score.
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Confidence in a book of `level_count` levels holding `total_volume`.
///
/// Deeper books score higher, capped at 100. Books whose total volume is
/// below `min_volume` are scaled by `thin_book_factor`.
pub fn depth_confidence(
    level_count: usize,
    total_volume: f64,
    min_volume: f64,
    config: &AnalyzerConfig,
) -> f64 {
    let base = (level_count as f64 * config.confidence_per_level).min(MAX_CONFIDENCE);
    if total_volume < min_volume {
        base * config.thin_book_factor
    } else {
        base
    }
}
