//! Order book analytics for the dom-flow system.
//!
//! This crate handles:
//! - Depth aggregation (per-side totals, strong levels, imbalance, pressure)
//! - Book confidence scoring
//! - Absorption scoring across consecutive snapshots
//! - Time-boxed average level volume
//! - The `OrderFlowAnalyzer` that ties them to a book source

pub mod absorption;
pub mod analyzer;
pub mod confidence;
pub mod depth;
pub mod level_cache;

pub use absorption::{Absorption, AbsorptionSignal, AbsorptionTracker, DepthSample};
pub use analyzer::OrderFlowAnalyzer;
pub use confidence::depth_confidence;
pub use depth::DepthSummary;
pub use level_cache::AverageVolumeCache;
