// Price-history providers: where the close series comes from
pub mod csv_parser;
pub mod yahoo;

pub use csv_parser::{CsvFormat, CsvPriceProvider};
pub use yahoo::YahooChartProvider;

use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rsi_shared::{HistoryRequest, PriceSeries};

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the close series for `request.symbol`.
    ///
    /// Fails with `NotFound` when the source has no data for the symbol.
    async fn fetch(&self, request: &HistoryRequest) -> Result<PriceSeries>;
}

#[async_trait]
impl<P: PriceHistoryProvider + ?Sized> PriceHistoryProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, request: &HistoryRequest) -> Result<PriceSeries> {
        (**self).fetch(request).await
    }
}

/// Trims and upper-cases a ticker symbol such as " reliance.ns ".
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(EngineError::InvalidArgument("symbol must not be empty".to_string()));
    }
    if symbol.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        return Err(EngineError::InvalidArgument(format!("invalid symbol '{}'", symbol)));
    }
    Ok(symbol.to_ascii_uppercase())
}
