//! Session replay runner.
//!
//! Feeds a recorded session tick by tick into an analyzer backed by an
//! in-memory book source and a manual clock, so the average-volume cache
//! expires on session time rather than wall time.

use crate::metrics::ReplaySummary;
use crate::session::{RecordedSession, RecordedTick};
use dom_core::{AnalysisResult, BookSnapshot, Config, Error, Result, TimestampMs};
use dom_feed::{ManualClock, MemoryBookSource};
use dom_features::OrderFlowAnalyzer;
use serde::Serialize;
use tracing::info;

/// How a single tick's analysis ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickStatus {
    Analyzed,
    Unavailable,
    InsufficientDepth,
}

/// Result record as it stood after one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickOutcome {
    pub ts_ms: TimestampMs,
    pub status: TickStatus,
    pub result: AnalysisResult,
}

/// Output of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub symbol: String,
    pub outcomes: Vec<TickOutcome>,
    pub summary: ReplaySummary,
}

/// Replays recorded sessions through an `OrderFlowAnalyzer`.
pub struct SessionReplay {
    config: Config,
}

impl SessionReplay {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Replay a session from a fresh analyzer.
    pub fn run(&self, session: &RecordedSession) -> Result<ReplayReport> {
        let symbol = session.symbol.as_str();

        let mut source = MemoryBookSource::new();
        source.add_symbol(session.symbol_info());
        // The analyzer only binds to instruments that expose a book.
        source.set_book(symbol, BookSnapshot::default())?;

        let start_ms = session.ticks.first().map(|t| t.ts_ms).unwrap_or(0);
        let mut analyzer =
            OrderFlowAnalyzer::with_clock(source, ManualClock::new(start_ms), &self.config);
        analyzer.init(symbol, self.config.instrument.logging_enabled)?;

        let mut outcomes = Vec::with_capacity(session.ticks.len());
        for tick in &session.ticks {
            analyzer.clock_mut().set(tick.ts_ms);
            apply_tick(analyzer.source_mut(), symbol, tick)?;

            let status = match analyzer.analyze() {
                Ok(()) => TickStatus::Analyzed,
                Err(Error::InsufficientDepth { .. }) => TickStatus::InsufficientDepth,
                Err(e) if e.is_transient() => TickStatus::Unavailable,
                Err(e) => return Err(e),
            };

            outcomes.push(TickOutcome {
                ts_ms: tick.ts_ms,
                status,
                result: analyzer.result().clone(),
            });
        }

        let summary = ReplaySummary::from_outcomes(&outcomes);
        info!(
            symbol,
            ticks = summary.total_ticks,
            analyzed = summary.analyzed_ticks,
            duration_ms = session.duration_ms(),
            "replay finished"
        );

        Ok(ReplayReport {
            symbol: session.symbol.clone(),
            outcomes,
            summary,
        })
    }
}

fn apply_tick(source: &mut MemoryBookSource, symbol: &str, tick: &RecordedTick) -> Result<()> {
    if let Some(price) = tick.price {
        source.set_price(symbol, price)?;
    }
    match tick.snapshot() {
        Some(snapshot) => source.set_book(symbol, snapshot),
        None => source.clear_book(symbol),
    }
}
