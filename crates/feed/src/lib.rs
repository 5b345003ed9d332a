//! Market data feed plumbing for the dom-flow system.
//!
//! This crate handles:
//! - The `BookSource` collaborator interface
//! - An in-memory book source for replay and tests
//! - Raw feed entry classification (limit/market entries to bid/ask)
//! - Wall-clock abstraction for time-boxed caches

pub mod classifier;
pub mod clock;
pub mod source;

pub use classifier::{BookClassifier, BookEntryKind, ClassificationStats, RawBookEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use source::{BookSource, MemoryBookSource};
