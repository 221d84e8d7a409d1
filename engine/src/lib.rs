// Engine library root: price history in, RSI out.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod report;
pub mod services;

pub use error::{EngineError, Result};
pub use indicators::{compute_rsi, DEFAULT_RSI_WINDOW};
pub use rsi_shared::{HistoryRange, HistoryRequest, Interval, PricePoint, PriceSeries, RsiPoint, RsiSeries};
