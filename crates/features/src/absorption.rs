//! Absorption scoring.
//!
//! Compares the current price and per-side depth with the previous sample.
//! A price rise while ask depth drains means sellers are being absorbed
//! (bullish, 70..=100). A price drop while bid depth drains is the bearish
//! mirror (0..=30). Anything else is neutral (50).

/// Score when there is no signal.
pub const NEUTRAL_SCORE: f64 = 50.0;
/// Floor of the bullish band.
pub const BULLISH_BASE: f64 = 70.0;
/// Ceiling of the bearish band.
pub const BEARISH_BASE: f64 = 30.0;
/// Largest adjustment away from a band edge.
pub const MAX_ADJUSTMENT: f64 = 30.0;

/// Price and per-side depth at one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthSample {
    pub price: f64,
    pub bid_depth: f64,
    pub ask_depth: f64,
}

impl DepthSample {
    pub fn new(price: f64, bid_depth: f64, ask_depth: f64) -> Self {
        Self {
            price,
            bid_depth,
            ask_depth,
        }
    }
}

/// Which branch produced the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorptionSignal {
    /// No previous sample; state was seeded.
    Seeded,
    Neutral,
    Bullish,
    Bearish,
}

/// Score and the branch that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    pub score: f64,
    pub signal: AbsorptionSignal,
}

impl Absorption {
    fn neutral(signal: AbsorptionSignal) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            signal,
        }
    }
}

/// Stateful absorption scorer for one instrument.
#[derive(Debug, Clone, Default)]
pub struct AbsorptionTracker {
    previous: Option<DepthSample>,
}

impl AbsorptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `current` against the previous sample, then store `current`.
    ///
    /// A previous sample with a zero price counts as no observation.
    pub fn update(&mut self, current: DepthSample) -> Absorption {
        let absorption = match self.previous {
            Some(prev) if prev.price != 0.0 => score(&prev, &current),
            _ => Absorption::neutral(AbsorptionSignal::Seeded),
        };
        self.previous = Some(current);
        absorption
    }

    /// The sample stored by the last update.
    pub fn previous(&self) -> Option<DepthSample> {
        self.previous
    }

    /// Forget the previous sample.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

fn score(prev: &DepthSample, current: &DepthSample) -> Absorption {
    let price_change = current.price - prev.price;
    let bid_depth_change = current.bid_depth - prev.bid_depth;
    let ask_depth_change = current.ask_depth - prev.ask_depth;

    if price_change > 0.0 && ask_depth_change < 0.0 && current.ask_depth > 0.0 {
        let drain = ask_depth_change.abs() / current.ask_depth * 100.0;
        Absorption {
            score: BULLISH_BASE + drain.min(MAX_ADJUSTMENT),
            signal: AbsorptionSignal::Bullish,
        }
    } else if price_change < 0.0 && bid_depth_change < 0.0 && current.bid_depth > 0.0 {
        let drain = bid_depth_change.abs() / current.bid_depth * 100.0;
        Absorption {
            score: BEARISH_BASE - drain.min(MAX_ADJUSTMENT),
            signal: AbsorptionSignal::Bearish,
        }
    } else {
        Absorption::neutral(AbsorptionSignal::Neutral)
    }
}
