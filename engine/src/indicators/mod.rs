// Technical indicators module
pub mod rsi;
pub mod sma;

pub use rsi::{compute_rsi, rsi_values, window_from_signed, Rsi, DEFAULT_RSI_WINDOW};
pub use sma::rolling_mean;

use serde_json::Value;

// Common trait for indicators computed over a close series
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, closes: &[f64]) -> Vec<Option<f64>>; // None where the indicator is undefined
}
