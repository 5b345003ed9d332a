//! Error types for the dom-flow system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the dom-flow system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or malformed data).
    #[error("Data error: {0}")]
    Data(String),

    /// Symbol metadata could not be resolved.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No book data is available from the feed.
    #[error("Book unavailable: {0}")]
    BookUnavailable(String),

    /// Subscribing to book updates failed.
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Analysis was requested before a successful init.
    #[error("Analyzer is not initialized")]
    NotInitialized,

    /// Book is present but too shallow to trust.
    #[error("Insufficient depth: {levels} levels, need at least {required}")]
    InsufficientDepth { levels: usize, required: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a symbol-not-found error.
    pub fn symbol_not_found(symbol: impl Into<String>) -> Self {
        Error::SymbolNotFound(symbol.into())
    }

    /// Create a book-unavailable error.
    pub fn book_unavailable(msg: impl Into<String>) -> Self {
        Error::BookUnavailable(msg.into())
    }

    /// Create a subscription error.
    pub fn subscription(msg: impl Into<String>) -> Self {
        Error::Subscription(msg.into())
    }

    /// True for errors that are expected to clear on a later call.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::BookUnavailable(_) | Error::InsufficientDepth { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_depth_message() {
        let err = Error::InsufficientDepth { levels: 3, required: 4 };
        assert_eq!(
            err.to_string(),
            "Insufficient depth: 3 levels, need at least 4"
        );
    }

    #[test]
    fn test_transient_kinds() {
        assert!(Error::book_unavailable("EURUSD").is_transient());
        assert!(Error::InsufficientDepth { levels: 0, required: 4 }.is_transient());
        assert!(!Error::NotInitialized.is_transient());
        assert!(!Error::subscription("rejected").is_transient());
    }
}
