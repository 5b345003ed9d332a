//! Order flow analyzer.
//!
//! Binds to one instrument, holds its book subscription, and turns each
//! fresh book snapshot into an `AnalysisResult`.
//!
//! The analyzer is `Uninitialized` until `init` succeeds and returns there on
//! `deinit` (or drop). `analyze` only runs while subscribed.

use crate::absorption::{AbsorptionSignal, AbsorptionTracker, DepthSample};
use crate::confidence::depth_confidence;
use crate::depth::DepthSummary;
use crate::level_cache::AverageVolumeCache;
use dom_core::config::{AnalyzerConfig, VolumeThresholdConfig};
use dom_core::{AnalysisResult, BookSnapshot, Config, Error, Result, SymbolInfo};
use dom_feed::{BookSource, Clock, SystemClock};
use tracing::{debug, error, info, warn};

/// Stateful depth-of-market analyzer for a single instrument.
pub struct OrderFlowAnalyzer<S: BookSource, C: Clock = SystemClock> {
    source: S,
    clock: C,
    config: AnalyzerConfig,
    thresholds: VolumeThresholdConfig,
    /// Bound instrument (the configured default before `init`).
    instrument: String,
    logging_enabled: bool,
    /// Resolved metadata; `Some` exactly while subscribed.
    symbol: Option<SymbolInfo>,
    /// Last known reference price.
    current_price: f64,
    absorption: AbsorptionTracker,
    last_signal: Option<AbsorptionSignal>,
    average_volume: AverageVolumeCache,
    result: AnalysisResult,
}

impl<S: BookSource> OrderFlowAnalyzer<S> {
    /// Create an analyzer driven by the system clock.
    pub fn new(source: S, config: &Config) -> Self {
        Self::with_clock(source, SystemClock, config)
    }
}

impl<S: BookSource, C: Clock> OrderFlowAnalyzer<S, C> {
    /// Create an analyzer with an explicit clock.
    pub fn with_clock(source: S, clock: C, config: &Config) -> Self {
        Self {
            source,
            clock,
            config: config.analyzer.clone(),
            thresholds: config.thresholds.clone(),
            instrument: config.instrument.symbol.clone(),
            logging_enabled: config.instrument.logging_enabled,
            symbol: None,
            current_price: 0.0,
            absorption: AbsorptionTracker::new(),
            last_signal: None,
            average_volume: AverageVolumeCache::new(config.analyzer.average_volume_ttl_ms),
            result: AnalysisResult::default(),
        }
    }

    /// Bind to `instrument` and subscribe to its book.
    ///
    /// Fails if the symbol is unknown, the feed has no book for it, or the
    /// subscription is rejected. Re-initializing releases the previous
    /// subscription first; switching instruments also drops carried state.
    pub fn init(&mut self, instrument: &str, logging_enabled: bool) -> Result<()> {
        self.deinit();
        if instrument != self.instrument {
            self.reset_state();
        }
        self.instrument = instrument.to_string();
        self.logging_enabled = logging_enabled;

        let symbol = match self.source.symbol_info(instrument) {
            Ok(symbol) => symbol,
            Err(e) => {
                if self.logging_enabled {
                    error!(instrument, error = %e, "failed to resolve symbol metadata");
                }
                return Err(e);
            }
        };

        if let Err(e) = self.source.snapshot(instrument) {
            if self.logging_enabled {
                error!(instrument, error = %e, "no book data available");
            }
            return Err(e);
        }

        if let Err(e) = self.source.subscribe(instrument) {
            if self.logging_enabled {
                error!(instrument, error = %e, "failed to subscribe to book updates");
            }
            return Err(e);
        }

        if self.logging_enabled {
            info!(
                instrument,
                tick_size = symbol.tick_size,
                min_volume = self.min_volume_threshold(),
                "order flow analyzer initialized"
            );
        }
        self.symbol = Some(symbol);
        Ok(())
    }

    /// Release the book subscription. Safe to call repeatedly.
    pub fn deinit(&mut self) {
        if let Some(symbol) = self.symbol.take() {
            self.source.unsubscribe(&symbol.symbol);
            if self.logging_enabled {
                info!(instrument = %symbol.symbol, "order flow analyzer released");
            }
        }
    }

    /// Whether the feed exposes a book (possibly empty) for the instrument.
    pub fn is_available(&self) -> bool {
        self.source.snapshot(&self.instrument).is_ok()
    }

    /// Whether `init` succeeded and the subscription is held.
    pub fn is_initialized(&self) -> bool {
        self.symbol.is_some()
    }

    /// Analyze the current book.
    ///
    /// On an unavailable or empty book only `is_dom_available` and
    /// `dom_confidence` are updated; on a shallow book only the confidence
    /// (and availability) change. All other result fields keep the values
    /// of the last successful run.
    pub fn analyze(&mut self) -> Result<()> {
        if self.symbol.is_none() {
            return Err(Error::NotInitialized);
        }

        self.refresh_price();

        let snapshot = match self.source.snapshot(&self.instrument) {
            Ok(snapshot) if !snapshot.is_empty() => snapshot,
            other => {
                self.result.is_dom_available = false;
                self.result.dom_confidence = 0.0;
                return Err(match other {
                    Err(e) => e,
                    Ok(_) => Error::book_unavailable(format!("empty book for {}", self.instrument)),
                });
            }
        };

        let required = self.config.min_levels;
        if snapshot.len() < required {
            self.result.is_dom_available = true;
            self.result.dom_confidence = self.config.insufficient_depth_confidence;
            if self.logging_enabled {
                warn!(
                    instrument = %self.instrument,
                    levels = snapshot.len(),
                    required,
                    "insufficient book depth"
                );
            }
            return Err(Error::InsufficientDepth {
                levels: snapshot.len(),
                required,
            });
        }

        self.result = self.compute(&snapshot);

        if self.logging_enabled {
            debug!(
                instrument = %self.instrument,
                imbalance = self.result.bid_ask_imbalance,
                pressure = self.result.order_book_pressure,
                absorption = self.result.absorption_score,
                confidence = self.result.dom_confidence,
                "book analyzed"
            );
        }
        Ok(())
    }

    /// Build a fresh result record from a usable snapshot.
    fn compute(&mut self, snapshot: &BookSnapshot) -> AnalysisResult {
        let average = self.average_level_volume();
        let depth =
            DepthSummary::from_snapshot(snapshot, average * self.config.strong_level_multiplier);

        let absorption = self.absorption.update(DepthSample::new(
            self.current_price,
            depth.bid_volume,
            depth.ask_volume,
        ));
        self.last_signal = Some(absorption.signal);

        AnalysisResult {
            bid_ask_imbalance: depth.imbalance_ratio(),
            order_book_pressure: depth.pressure(),
            total_bid_depth: depth.bid_volume,
            total_ask_depth: depth.ask_volume,
            strong_bid_levels: depth.strong_bid_levels,
            strong_ask_levels: depth.strong_ask_levels,
            absorption_score: absorption.score,
            is_dom_available: true,
            dom_confidence: depth_confidence(
                depth.level_count,
                depth.total_volume(),
                self.min_volume_threshold(),
                &self.config,
            ),
        }
    }

    fn refresh_price(&mut self) {
        match self.source.current_price(&self.instrument) {
            Ok(price) => self.current_price = price,
            Err(e) if self.logging_enabled => {
                debug!(instrument = %self.instrument, error = %e, "keeping last price")
            }
            Err(_) => {}
        }
    }

    /// Mean volume per level, refetched from the feed once the cache expires.
    pub fn average_level_volume(&mut self) -> f64 {
        let now = self.clock.now_ms();
        let source = &self.source;
        let instrument = self.instrument.as_str();
        self.average_volume
            .get_or_refresh(now, || source.snapshot(instrument).ok())
    }

    /// Minimum total book volume for the bound instrument's class.
    pub fn min_volume_threshold(&self) -> f64 {
        self.thresholds.for_symbol(&self.instrument)
    }

    fn reset_state(&mut self) {
        self.absorption.reset();
        self.last_signal = None;
        self.average_volume.clear();
        self.current_price = 0.0;
        self.result = AnalysisResult::default();
    }

    /// Result of the last analysis (see `analyze` for partial updates).
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// Branch taken by the last absorption calculation.
    pub fn last_signal(&self) -> Option<AbsorptionSignal> {
        self.last_signal
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn symbol_info(&self) -> Option<&SymbolInfo> {
        self.symbol.as_ref()
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<S: BookSource, C: Clock> Drop for OrderFlowAnalyzer<S, C> {
    fn drop(&mut self) {
        self.deinit();
    }
}
