// Relative Strength Index (RSI) over simple rolling means of gains and losses
use super::sma::rolling_mean;
use super::IndicatorCalculator;
use crate::error::{EngineError, Result};
use rsi_shared::{PriceSeries, RsiPoint, RsiSeries};
use serde_json::Value;

pub const DEFAULT_RSI_WINDOW: usize = 14;

pub struct Rsi {
    name: String,
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(EngineError::InvalidArgument("RSI window must be a positive integer".to_string()));
        }
        Ok(Self {
            name: format!("RSI({})", window),
            window,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// RSI aligned with `prices`, one entry per close.
    pub fn compute(&self, prices: &PriceSeries) -> Result<RsiSeries> {
        if prices.is_empty() {
            return Err(EngineError::InvalidArgument("price series is empty".to_string()));
        }
        let values = self.calculate(&prices.closes());
        let points = prices
            .points()
            .iter()
            .zip(values)
            .map(|(price, value)| RsiPoint { date: price.date, value })
            .collect();
        Ok(RsiSeries { window: self.window, points })
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            name: format!("RSI({})", DEFAULT_RSI_WINDOW),
            window: DEFAULT_RSI_WINDOW,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, closes: &[f64]) -> Vec<Option<f64>> {
        if closes.is_empty() {
            return Vec::new();
        }
        // Window was checked in new()
        rsi_values(closes, self.window).unwrap_or_else(|_| vec![None; closes.len()])
    }
}

/// Converts a caller-supplied window, which may be zero or negative, into a usable one.
pub fn window_from_signed(window: i64) -> Result<usize> {
    if window <= 0 {
        return Err(EngineError::InvalidArgument(format!(
            "RSI window must be a positive integer, got {}",
            window
        )));
    }
    usize::try_from(window).map_err(|_| EngineError::InvalidArgument(format!("RSI window {} is too large", window)))
}

/// RSI for `prices` over `window` periods.
pub fn compute_rsi(prices: &PriceSeries, window: usize) -> Result<RsiSeries> {
    Rsi::new(window)?.compute(prices)
}

/// RSI values for a raw close series.
///
/// The first `window` entries are `None`: `delta[0]` does not exist, so the first full
/// window of deltas ends at index `window`. Division follows IEEE-754: a window with gains
/// and no losses gives `rs = +inf` and an RSI of exactly 100, while a window with neither
/// gives `0 / 0 = NaN`, which is reported as `None`.
pub fn rsi_values(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(EngineError::InvalidArgument("RSI window must be a positive integer".to_string()));
    }
    if closes.is_empty() {
        return Err(EngineError::InvalidArgument("price series is empty".to_string()));
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(None);
    losses.push(None);
    for pair in closes.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(Some(if delta > 0.0 { delta } else { 0.0 }));
        losses.push(Some(if delta < 0.0 { -delta } else { 0.0 }));
    }

    let avg_gains = rolling_mean(&gains, window);
    let avg_losses = rolling_mean(&losses, window);

    let results: Vec<Option<f64>> = avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(avg_gain, avg_loss)| match (avg_gain, avg_loss) {
            (Some(gain), Some(loss)) => {
                let rs = gain / loss;
                let rsi = 100.0 - 100.0 / (1.0 + rs);
                if rsi.is_nan() {
                    None
                } else {
                    Some(rsi)
                }
            }
            _ => None,
        })
        .collect();

    tracing::debug!(
        window,
        len = closes.len(),
        defined = results.iter().filter(|v| v.is_some()).count(),
        "Computed RSI"
    );
    Ok(results)
}
