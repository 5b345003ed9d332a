//! PyO3 bindings for dom-flow.
//!
//! Exposes the order flow analyzer to Python:
//! - Book level and side types
//! - Analysis result record
//! - Analyzer backed by an in-memory book source that Python feeds

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use dom_core::{
    AnalysisResult as RustAnalysisResult,
    BookLevel as RustBookLevel,
    BookSide as RustBookSide,
    BookSnapshot,
    Config as RustConfig,
    SymbolInfo,
};
use dom_feed::MemoryBookSource;
use dom_features::OrderFlowAnalyzer;

fn to_py_err(e: dom_core::Error) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Side of a resting order.
#[pyclass]
#[derive(Clone, Copy)]
pub enum BookSide {
    Bid,
    Ask,
}

#[pymethods]
impl BookSide {
    #[getter]
    fn sign(&self) -> f64 {
        RustBookSide::from(*self).sign()
    }
}

impl From<BookSide> for RustBookSide {
    fn from(s: BookSide) -> Self {
        match s {
            BookSide::Bid => RustBookSide::Bid,
            BookSide::Ask => RustBookSide::Ask,
        }
    }
}

impl From<RustBookSide> for BookSide {
    fn from(s: RustBookSide) -> Self {
        match s {
            RustBookSide::Bid => BookSide::Bid,
            RustBookSide::Ask => BookSide::Ask,
        }
    }
}

/// One visible price level.
#[pyclass]
#[derive(Clone)]
pub struct BookLevel {
    #[pyo3(get, set)]
    pub side: BookSide,
    #[pyo3(get, set)]
    pub price: f64,
    #[pyo3(get, set)]
    pub volume: f64,
}

#[pymethods]
impl BookLevel {
    #[new]
    fn new(side: BookSide, price: f64, volume: f64) -> Self {
        BookLevel { side, price, volume }
    }

    fn __repr__(&self) -> String {
        let side = match self.side {
            BookSide::Bid => "Bid",
            BookSide::Ask => "Ask",
        };
        format!("BookLevel({side}, price={}, volume={})", self.price, self.volume)
    }
}

impl From<BookLevel> for RustBookLevel {
    fn from(l: BookLevel) -> Self {
        RustBookLevel {
            side: l.side.into(),
            price: l.price,
            volume: l.volume,
        }
    }
}

/// Output of one order book analysis.
#[pyclass]
#[derive(Clone)]
pub struct AnalysisResult {
    #[pyo3(get)]
    pub bid_ask_imbalance: f64,
    #[pyo3(get)]
    pub order_book_pressure: f64,
    #[pyo3(get)]
    pub total_bid_depth: f64,
    #[pyo3(get)]
    pub total_ask_depth: f64,
    #[pyo3(get)]
    pub strong_bid_levels: u32,
    #[pyo3(get)]
    pub strong_ask_levels: u32,
    #[pyo3(get)]
    pub absorption_score: f64,
    #[pyo3(get)]
    pub is_dom_available: bool,
    #[pyo3(get)]
    pub dom_confidence: f64,
}

#[pymethods]
impl AnalysisResult {
    fn __repr__(&self) -> String {
        format!(
            "AnalysisResult(imbalance={:.4}, pressure={:.4}, absorption={:.1}, confidence={:.1}, available={})",
            self.bid_ask_imbalance,
            self.order_book_pressure,
            self.absorption_score,
            self.dom_confidence,
            self.is_dom_available
        )
    }
}

impl From<&RustAnalysisResult> for AnalysisResult {
    fn from(r: &RustAnalysisResult) -> Self {
        AnalysisResult {
            bid_ask_imbalance: r.bid_ask_imbalance,
            order_book_pressure: r.order_book_pressure,
            total_bid_depth: r.total_bid_depth,
            total_ask_depth: r.total_ask_depth,
            strong_bid_levels: r.strong_bid_levels,
            strong_ask_levels: r.strong_ask_levels,
            absorption_score: r.absorption_score,
            is_dom_available: r.is_dom_available,
            dom_confidence: r.dom_confidence,
        }
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Order flow analyzer fed with books pushed from Python.
#[pyclass]
pub struct PyOrderFlowAnalyzer {
    inner: OrderFlowAnalyzer<MemoryBookSource>,
}

#[pymethods]
impl PyOrderFlowAnalyzer {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => RustConfig::from_json_str(json).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        Ok(PyOrderFlowAnalyzer {
            inner: OrderFlowAnalyzer::new(MemoryBookSource::new(), &config),
        })
    }

    /// Register an instrument with the feed.
    #[pyo3(signature = (symbol, tick_size=0.00001, digits=5))]
    fn add_symbol(&mut self, symbol: &str, tick_size: f64, digits: u32) {
        self.inner
            .source_mut()
            .add_symbol(SymbolInfo::new(symbol, tick_size, digits));
    }

    /// Replace the visible book for an instrument.
    fn set_book(&mut self, symbol: &str, levels: Vec<BookLevel>) -> PyResult<()> {
        let snapshot: BookSnapshot = levels.into_iter().map(RustBookLevel::from).collect();
        self.inner
            .source_mut()
            .set_book(symbol, snapshot)
            .map_err(to_py_err)
    }

    /// Mark the book as unavailable.
    fn clear_book(&mut self, symbol: &str) -> PyResult<()> {
        self.inner.source_mut().clear_book(symbol).map_err(to_py_err)
    }

    /// Set the reference price.
    fn set_price(&mut self, symbol: &str, price: f64) -> PyResult<()> {
        self.inner
            .source_mut()
            .set_price(symbol, price)
            .map_err(to_py_err)
    }

    /// Bind to an instrument. Returns False on failure.
    #[pyo3(signature = (instrument, logging_enabled=true))]
    fn init(&mut self, instrument: &str, logging_enabled: bool) -> bool {
        self.inner.init(instrument, logging_enabled).is_ok()
    }

    /// Release the subscription.
    fn deinit(&mut self) {
        self.inner.deinit();
    }

    /// Analyze the current book. Returns False on failure.
    fn analyze(&mut self) -> bool {
        self.inner.analyze().is_ok()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    #[getter]
    fn result(&self) -> AnalysisResult {
        self.inner.result().into()
    }

    #[getter]
    fn instrument(&self) -> String {
        self.inner.instrument().to_string()
    }

    fn min_volume_threshold(&self) -> f64 {
        self.inner.min_volume_threshold()
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// dom-flow - order book analytics in Rust for Python.
#[pymodule]
fn dom_flow(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<BookSide>()?;
    m.add_class::<BookLevel>()?;
    m.add_class::<AnalysisResult>()?;

    // Engine classes
    m.add_class::<PyOrderFlowAnalyzer>()?;

    Ok(())
}
