//! Normalizes OHLCV CSV data into ordered, typed bars for candlestick charts.

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod indicators;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod series;
pub mod session;

pub use config::{MalformedRowPolicy, NormalizerConfig};
pub use error::{ConfigError, ExportError, LoadError, NormalizeError};
pub use model::{Bar, Column, Price, RawRow};
pub use normalizer::{NormalizeReport, TimeSeriesNormalizer};
