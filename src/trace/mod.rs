//! # trace
//!
//! `trace` is the module to work with logged frame streams: frame records,
//! per-identifier cadence estimation, and signal series extraction.

pub mod cadence;
pub mod frame;
pub mod series;

pub use cadence::{CadenceConfig, CadenceStats};
pub use frame::FrameRecord;
pub use series::{SampleOrigin, SeriesPoint, SignalSeries, TraceAnalyzer};
