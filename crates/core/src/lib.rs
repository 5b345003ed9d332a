//! Core types and configuration for the dom-flow system.
//!
//! This crate provides shared types used across all other crates:
//! - Order book types (levels, snapshots, symbol metadata)
//! - Analysis result record
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
