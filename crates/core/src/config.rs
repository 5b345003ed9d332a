//! Configuration structures for the dom-flow system.

use crate::error::{Error, Result};
use crate::types::InstrumentClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrument configuration.
    pub instrument: InstrumentConfig,
    /// Analyzer tuning.
    pub analyzer: AnalyzerConfig,
    /// Minimum book volume per instrument class.
    pub thresholds: VolumeThresholdConfig,
}

impl Config {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        self.analyzer.validate()?;
        self.thresholds.validate()
    }
}

/// Instrument-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Default instrument (e.g., "EURUSD").
    pub symbol: String,
    /// Emit diagnostic log lines.
    pub logging_enabled: bool,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: "EURUSD".to_string(),
            logging_enabled: true,
        }
    }
}

/// Analyzer tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Minimum number of levels for a usable book.
    pub min_levels: usize,
    /// A level is strong when its volume exceeds this multiple of the average.
    pub strong_level_multiplier: f64,
    /// Confidence points per visible level.
    pub confidence_per_level: f64,
    /// Confidence multiplier applied to books below the volume threshold.
    pub thin_book_factor: f64,
    /// Confidence reported for a book with fewer than `min_levels` levels.
    pub insufficient_depth_confidence: f64,
    /// Lifetime of the cached average level volume (ms).
    pub average_volume_ttl_ms: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_levels: 4,
            strong_level_multiplier: 2.0,
            confidence_per_level: 5.0,
            thin_book_factor: 0.5,
            insufficient_depth_confidence: 10.0,
            average_volume_ttl_ms: 60_000,
        }
    }
}

impl AnalyzerConfig {
    fn validate(&self) -> Result<()> {
        if self.min_levels == 0 {
            return Err(Error::config("min_levels must be at least 1"));
        }
        if self.strong_level_multiplier <= 0.0 {
            return Err(Error::config("strong_level_multiplier must be positive"));
        }
        if self.confidence_per_level < 0.0 {
            return Err(Error::config("confidence_per_level must not be negative"));
        }
        if !(self.thin_book_factor > 0.0 && self.thin_book_factor <= 1.0) {
            return Err(Error::config("thin_book_factor must be in (0, 1]"));
        }
        if !(0.0..=100.0).contains(&self.insufficient_depth_confidence) {
            return Err(Error::config(
                "insufficient_depth_confidence must be in [0, 100]",
            ));
        }
        if self.average_volume_ttl_ms < 0 {
            return Err(Error::config("average_volume_ttl_ms must not be negative"));
        }
        Ok(())
    }
}

/// Minimum total book volume per instrument class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeThresholdConfig {
    pub crypto: f64,
    pub index: f64,
    pub forex: f64,
}

impl Default for VolumeThresholdConfig {
    fn default() -> Self {
        Self {
            crypto: 10.0,
            index: 100.0,
            forex: 1000.0,
        }
    }
}

impl VolumeThresholdConfig {
    /// Threshold for an instrument class.
    pub fn for_class(&self, class: InstrumentClass) -> f64 {
        match class {
            InstrumentClass::Crypto => self.crypto,
            InstrumentClass::Index => self.index,
            InstrumentClass::Forex => self.forex,
        }
    }

    /// Threshold for an instrument identifier.
    pub fn for_symbol(&self, symbol: &str) -> f64 {
        self.for_class(InstrumentClass::classify(symbol))
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("crypto", self.crypto),
            ("index", self.index),
            ("forex", self.forex),
        ] {
            if value <= 0.0 {
                return Err(Error::config(format!(
                    "{name} volume threshold must be positive"
                )));
            }
        }
        Ok(())
    }
}
