// Fetch -> compute -> report for one symbol
use crate::data::PriceHistoryProvider;
use crate::error::Result;
use crate::indicators::{IndicatorCalculator, Rsi};
use crate::report::{RsiReport, Thresholds};
use rsi_shared::HistoryRequest;

pub struct RsiService<P> {
    provider: P,
    thresholds: Thresholds,
}

impl<P: PriceHistoryProvider> RsiService<P> {
    pub fn new(provider: P, thresholds: Thresholds) -> Self {
        RsiService { provider, thresholds }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn run(&self, request: &HistoryRequest, window: usize) -> Result<RsiReport> {
        // Validate before touching the network.
        let rsi = Rsi::new(window)?;

        tracing::info!(
            provider = self.provider.name(),
            symbol = %request.symbol,
            range = %request.range,
            interval = %request.interval,
            indicator = rsi.name(),
            parameters = %rsi.parameters(),
            "Fetching price history"
        );
        let prices = self.provider.fetch(request).await?;
        tracing::info!(
            symbol = %prices.symbol(),
            rows = prices.len(),
            first = ?prices.first_date(),
            last = ?prices.last_date(),
            "Fetched price history"
        );

        let series = rsi.compute(&prices)?;
        if series.defined_count() == 0 {
            tracing::warn!(symbol = %prices.symbol(), rows = prices.len(), window, "No RSI values could be computed");
        }

        let report = RsiReport::new(rsi.name(), &prices, &series, self.thresholds)?;
        if let Some(latest) = report.latest() {
            tracing::info!(symbol = %report.symbol, date = %latest.date, rsi = latest.rsi, zone = %latest.zone, "Latest RSI");
        }
        Ok(report)
    }
}
