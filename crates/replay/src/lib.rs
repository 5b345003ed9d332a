//! Session replay for the dom-flow system.
//!
//! This crate provides:
//! - Recorded session format (timestamped books and prices)
//! - Deterministic replay through the order flow analyzer
//! - Per-tick outcomes and summary statistics

pub mod metrics;
pub mod runner;
pub mod session;

pub use metrics::ReplaySummary;
pub use runner::{ReplayReport, SessionReplay, TickOutcome, TickStatus};
pub use session::{RecordedSession, RecordedTick};
