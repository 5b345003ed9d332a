//! Book source interface and an in-memory implementation.

use crate::classifier::{BookClassifier, ClassificationStats, RawBookEntry};
use dom_core::{BookSnapshot, Error, Result, SymbolInfo};
use std::cell::Cell;
use std::collections::HashMap;
use tracing::debug;

/// Market data collaborator consumed by the analyzer.
///
/// Queries take `&self` and are expected to be cheap in-process lookups.
/// Subscription management takes `&mut self`.
pub trait BookSource {
    /// Resolve symbol metadata.
    fn symbol_info(&self, instrument: &str) -> Result<SymbolInfo>;

    /// Current visible book. An empty snapshot is a valid (empty) book.
    fn snapshot(&self, instrument: &str) -> Result<BookSnapshot>;

    /// Best current reference price.
    fn current_price(&self, instrument: &str) -> Result<f64>;

    /// Enable book delivery for an instrument.
    fn subscribe(&mut self, instrument: &str) -> Result<()>;

    /// Disable book delivery for an instrument.
    fn unsubscribe(&mut self, instrument: &str);
}

impl<T: BookSource + ?Sized> BookSource for &mut T {
    fn symbol_info(&self, instrument: &str) -> Result<SymbolInfo> {
        (**self).symbol_info(instrument)
    }

    fn snapshot(&self, instrument: &str) -> Result<BookSnapshot> {
        (**self).snapshot(instrument)
    }

    fn current_price(&self, instrument: &str) -> Result<f64> {
        (**self).current_price(instrument)
    }

    fn subscribe(&mut self, instrument: &str) -> Result<()> {
        (**self).subscribe(instrument)
    }

    fn unsubscribe(&mut self, instrument: &str) {
        (**self).unsubscribe(instrument)
    }
}

/// Per-instrument state held by the memory source.
#[derive(Debug, Clone)]
struct InstrumentFeed {
    info: SymbolInfo,
    book: Option<BookSnapshot>,
    price: Option<f64>,
    subscriptions: u32,
}

/// In-process book source.
///
/// Books and prices are pushed in by the owner; the analyzer pulls them
/// through `BookSource`.
#[derive(Debug, Default)]
pub struct MemoryBookSource {
    instruments: HashMap<String, InstrumentFeed>,
    classifier: BookClassifier,
    reject_subscriptions: bool,
    snapshot_requests: Cell<u64>,
}

impl MemoryBookSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instrument. Replaces any previous metadata but keeps
    /// the book, price and subscription count.
    pub fn add_symbol(&mut self, info: SymbolInfo) {
        let key = info.symbol.clone();
        match self.instruments.get_mut(&key) {
            Some(feed) => feed.info = info,
            None => {
                self.instruments.insert(
                    key,
                    InstrumentFeed {
                        info,
                        book: None,
                        price: None,
                        subscriptions: 0,
                    },
                );
            }
        }
    }

    /// Replace the visible book for an instrument.
    ///
    /// Rejects books holding a negative or non-finite volume and leaves the
    /// previous book in place.
    pub fn set_book(&mut self, instrument: &str, snapshot: BookSnapshot) -> Result<()> {
        if let Some(level) = snapshot.first_invalid_level() {
            return Err(Error::data(format!(
                "invalid volume {} at {:?} {} for {instrument}",
                level.volume, level.side, level.price
            )));
        }
        self.feed_mut(instrument)?.book = Some(snapshot);
        Ok(())
    }

    /// Replace the visible book from raw feed entries.
    pub fn set_raw_book(&mut self, instrument: &str, entries: &[RawBookEntry]) -> Result<()> {
        let snapshot = self.classifier.classify_book(entries);
        self.set_book(instrument, snapshot)
    }

    /// Mark the book as unavailable.
    pub fn clear_book(&mut self, instrument: &str) -> Result<()> {
        self.feed_mut(instrument)?.book = None;
        Ok(())
    }

    /// Set an explicit reference price.
    pub fn set_price(&mut self, instrument: &str, price: f64) -> Result<()> {
        self.feed_mut(instrument)?.price = Some(price);
        Ok(())
    }

    /// Drop the explicit price so the best bid is used again.
    pub fn clear_price(&mut self, instrument: &str) -> Result<()> {
        self.feed_mut(instrument)?.price = None;
        Ok(())
    }

    /// Make subsequent `subscribe` calls fail.
    pub fn set_reject_subscriptions(&mut self, reject: bool) {
        self.reject_subscriptions = reject;
    }

    /// Active subscriptions for an instrument.
    pub fn subscription_count(&self, instrument: &str) -> u32 {
        self.instruments
            .get(instrument)
            .map(|f| f.subscriptions)
            .unwrap_or(0)
    }

    pub fn is_subscribed(&self, instrument: &str) -> bool {
        self.subscription_count(instrument) > 0
    }

    /// Number of `snapshot` calls served so far.
    pub fn snapshot_requests(&self) -> u64 {
        self.snapshot_requests.get()
    }

    /// Statistics of raw entries pushed through `set_raw_book`.
    pub fn classification_stats(&self) -> &ClassificationStats {
        self.classifier.stats()
    }

    fn feed(&self, instrument: &str) -> Result<&InstrumentFeed> {
        self.instruments
            .get(instrument)
            .ok_or_else(|| Error::symbol_not_found(instrument))
    }

    fn feed_mut(&mut self, instrument: &str) -> Result<&mut InstrumentFeed> {
        self.instruments
            .get_mut(instrument)
            .ok_or_else(|| Error::symbol_not_found(instrument))
    }
}

impl BookSource for MemoryBookSource {
    fn symbol_info(&self, instrument: &str) -> Result<SymbolInfo> {
        self.feed(instrument).map(|f| f.info.clone())
    }

    fn snapshot(&self, instrument: &str) -> Result<BookSnapshot> {
        self.snapshot_requests.set(self.snapshot_requests.get() + 1);
        self.feed(instrument)?
            .book
            .clone()
            .ok_or_else(|| Error::book_unavailable(format!("no book for {instrument}")))
    }

    fn current_price(&self, instrument: &str) -> Result<f64> {
        let feed = self.feed(instrument)?;
        feed.price
            .or_else(|| feed.book.as_ref().and_then(|b| b.best_bid()))
            .ok_or_else(|| Error::book_unavailable(format!("no price for {instrument}")))
    }

    fn subscribe(&mut self, instrument: &str) -> Result<()> {
        if self.reject_subscriptions {
            return Err(Error::subscription(format!(
                "feed rejected subscription for {instrument}"
            )));
        }
        let feed = self.feed_mut(instrument)?;
        feed.subscriptions += 1;
        debug!(instrument, subscriptions = feed.subscriptions, "book subscribed");
        Ok(())
    }

    fn unsubscribe(&mut self, instrument: &str) {
        if let Some(feed) = self.instruments.get_mut(instrument) {
            feed.subscriptions = feed.subscriptions.saturating_sub(1);
            debug!(instrument, subscriptions = feed.subscriptions, "book unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::classifier::BookEntryKind;
    use dom_core::BookLevel;

    fn source_with(symbol: &str) -> MemoryBookSource {
        let mut source = MemoryBookSource::new();
        source.add_symbol(SymbolInfo::new(symbol, 0.00001, 5));
        source
    }

    #[test]
    fn test_unknown_symbol() {
        let source = MemoryBookSource::new();
        assert!(matches!(
            source.symbol_info("EURUSD"),
            Err(Error::SymbolNotFound(_))
        ));
        assert!(source.snapshot("EURUSD").is_err());
    }

    #[test]
    fn test_book_unavailable_until_set() {
        let mut source = source_with("EURUSD");
        assert!(matches!(
            source.snapshot("EURUSD"),
            Err(Error::BookUnavailable(_))
        ));

        source.set_book("EURUSD", BookSnapshot::default()).unwrap();
        let snap = source.snapshot("EURUSD").unwrap();
        assert!(snap.is_empty());
        assert_eq!(source.snapshot_requests(), 2);

        source.clear_book("EURUSD").unwrap();
        assert!(source.snapshot("EURUSD").is_err());
    }

    #[test]
    fn test_price_falls_back_to_best_bid() {
        let mut source = source_with("EURUSD");
        assert!(source.current_price("EURUSD").is_err());

        source
            .set_book(
                "EURUSD",
                BookSnapshot::new(vec![
                    BookLevel::bid(1.1000, 1.0),
                    BookLevel::bid(1.1001, 1.0),
                    BookLevel::ask(1.1003, 1.0),
                ]),
            )
            .unwrap();
        assert_relative_eq!(source.current_price("EURUSD").unwrap(), 1.1001);

        source.set_price("EURUSD", 1.2).unwrap();
        assert_relative_eq!(source.current_price("EURUSD").unwrap(), 1.2);

        source.clear_price("EURUSD").unwrap();
        assert_relative_eq!(source.current_price("EURUSD").unwrap(), 1.1001);
    }

    #[test]
    fn test_set_book_rejects_invalid_volume() {
        let mut source = source_with("EURUSD");
        let good = BookSnapshot::new(vec![BookLevel::bid(1.1000, 10.0), BookLevel::ask(1.1001, 10.0)]);
        source.set_book("EURUSD", good.clone()).unwrap();

        for volume in [-15.0, f64::NAN, f64::INFINITY] {
            let bad = BookSnapshot::new(vec![
                BookLevel::bid(1.1000, 10.0),
                BookLevel::ask(1.1001, volume),
            ]);
            assert!(matches!(source.set_book("EURUSD", bad), Err(Error::Data(_))));
        }

        assert_eq!(source.snapshot("EURUSD").unwrap(), good);
    }

    #[test]
    fn test_subscription_accounting() {
        let mut source = source_with("EURUSD");
        source.subscribe("EURUSD").unwrap();
        assert!(source.is_subscribed("EURUSD"));

        source.unsubscribe("EURUSD");
        source.unsubscribe("EURUSD");
        assert_eq!(source.subscription_count("EURUSD"), 0);

        source.set_reject_subscriptions(true);
        assert!(matches!(
            source.subscribe("EURUSD"),
            Err(Error::Subscription(_))
        ));
        assert!(!source.is_subscribed("EURUSD"));
    }

    #[test]
    fn test_raw_book() {
        let mut source = source_with("BTCUSD");
        source
            .set_raw_book(
                "BTCUSD",
                &[
                    RawBookEntry::new(BookEntryKind::SellMarket, 50_001.0, 0.5),
                    RawBookEntry::new(BookEntryKind::Buy, 50_000.0, 1.5),
                ],
            )
            .unwrap();

        let snap = source.snapshot("BTCUSD").unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(source.classification_stats().market_entries, 1);
    }
}
