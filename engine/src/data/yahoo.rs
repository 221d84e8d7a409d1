// Daily price history from a Yahoo Finance style chart endpoint
use super::{normalize_symbol, PriceHistoryProvider};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode, Url};
use rsi_shared::{HistoryRequest, PricePoint, PriceSeries};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = concat!("rsi-fetcher/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds; bars are dated in exchange-local time.
    #[serde(default)]
    gmtoffset: i64,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self { client, base_url: base_url.into() }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| EngineError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| EngineError::Config(format!("Base URL '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

fn bar_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate> {
    timestamp
        .checked_add(gmtoffset)
        .and_then(|local| DateTime::from_timestamp(local, 0))
        .map(|dt| dt.date_naive())
        .ok_or_else(|| EngineError::DataFormat(format!("Invalid bar timestamp: {}", timestamp)))
}

fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<PriceSeries> {
    if let Some(error) = envelope.chart.error {
        let description = error.description.unwrap_or_default();
        tracing::warn!(symbol = %symbol, code = %error.code, description = %description, "Chart endpoint returned an error");
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(EngineError::NotFound(symbol.to_string()));
        }
        return Err(EngineError::DataFormat(format!("{}: {}", error.code, description)));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| EngineError::NotFound(symbol.to_string()))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();
    if closes.len() != result.timestamp.len() {
        return Err(EngineError::DataFormat(format!(
            "{} timestamps but {} closes for '{}'",
            result.timestamp.len(),
            closes.len(),
            symbol
        )));
    }

    let mut points = Vec::with_capacity(closes.len());
    for (timestamp, close) in result.timestamp.iter().zip(closes) {
        // Null closes mark bars without trades
        if let Some(close) = close {
            points.push(PricePoint::new(bar_date(*timestamp, result.meta.gmtoffset)?, close));
        }
    }
    if points.is_empty() {
        return Err(EngineError::NotFound(symbol.to_string()));
    }

    tracing::debug!(
        symbol = %symbol,
        rows = points.len(),
        currency = result.meta.currency.as_deref().unwrap_or("?"),
        "Parsed chart response"
    );
    Ok(PriceSeries::from_unordered(symbol, points)?)
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, request: &HistoryRequest) -> Result<PriceSeries> {
        let symbol = normalize_symbol(&request.symbol)?;
        let url = self.chart_url(&symbol)?;
        tracing::info!(symbol = %symbol, range = %request.range, interval = %request.interval, "Fetching price history");

        let response = self
            .client
            .get(url.clone())
            .query(&[("range", request.range.as_str()), ("interval", request.interval.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!(symbol = %symbol, "Symbol not found");
            return Err(EngineError::NotFound(symbol));
        }
        if !status.is_success() {
            tracing::error!(symbol = %symbol, %status, "Price history request failed");
            return Err(EngineError::Network(format!("HTTP {} from {}", status, url)));
        }

        let envelope: ChartEnvelope = response.json().await?;
        parse_chart(&symbol, envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsi_shared::{HistoryRange, Interval};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // 2024-01-02/03/04 09:15 IST
    const TIMESTAMPS: [i64; 3] = [1704167100, 1704253500, 1704339900];

    fn chart_body(closes: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "RELIANCE.NS", "currency": "INR", "gmtoffset": 19800 },
                    "timestamp": TIMESTAMPS,
                    "indicators": { "quote": [{ "close": closes }] }
                }],
                "error": null
            }
        })
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn provider_for(server: &MockServer) -> YahooChartProvider {
        YahooChartProvider::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_daily_closes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/RELIANCE.NS"))
            .and(query_param("range", "2y"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(serde_json::json!([2580.5, null, 2601.25]))))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let series = provider.fetch(&HistoryRequest::daily("reliance.ns")).await.unwrap();
        assert_eq!(series.symbol(), "RELIANCE.NS");
        assert_eq!(
            series.points(),
            &[PricePoint::new(date(2024, 1, 2), 2580.5), PricePoint::new(date(2024, 1, 4), 2601.25)]
        );
    }

    #[tokio::test]
    async fn test_fetch_passes_range_and_interval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/TCS.NS"))
            .and(query_param("range", "6mo"))
            .and(query_param("interval", "1wk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(serde_json::json!([1.0, 2.0, 3.0]))))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let request = HistoryRequest::new("TCS.NS", HistoryRange::Month6, Interval::Week1);
        assert_eq!(provider.fetch(&request).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_404_is_not_found() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" } }
        });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(body))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.fetch(&HistoryRequest::daily("NOPE.NS")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(ref s) if s == "NOPE.NS"));
    }

    #[tokio::test]
    async fn test_fetch_chart_error_with_ok_status_is_not_found() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "delisted" } }
        });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.fetch(&HistoryRequest::daily("GONE")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_all_null_closes_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(serde_json::json!([null, null, null]))))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.fetch(&HistoryRequest::daily("HALT")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.fetch(&HistoryRequest::daily("INFY.NS")).await.unwrap_err();
        assert!(matches!(err, EngineError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_data_format() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.fetch(&HistoryRequest::daily("INFY.NS")).await.unwrap_err();
        assert!(matches!(err, EngineError::DataFormat(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network() {
        let provider = YahooChartProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = provider.fetch(&HistoryRequest::daily("INFY.NS")).await.unwrap_err();
        assert!(matches!(err, EngineError::Network(_)));
    }

    #[test]
    fn test_parse_chart_length_mismatch() {
        let mut body = chart_body(serde_json::json!([1.0, 2.0]));
        body["chart"]["result"][0]["timestamp"] = serde_json::json!([1704167100]);
        let envelope: ChartEnvelope = serde_json::from_value(body).unwrap();
        let err = parse_chart("X", envelope).unwrap_err();
        assert!(matches!(err, EngineError::DataFormat(_)));
    }

    #[test]
    fn test_bar_date_uses_exchange_offset() {
        // 2024-01-02 20:00 UTC is already 2024-01-03 in India
        assert_eq!(bar_date(1704225600, 19800).unwrap(), date(2024, 1, 3));
        assert_eq!(bar_date(1704225600, 0).unwrap(), date(2024, 1, 2));
    }

    #[test]
    fn test_bar_date_rejects_overflowing_timestamp() {
        assert!(matches!(bar_date(i64::MAX, 19800), Err(EngineError::DataFormat(_))));
        assert!(matches!(bar_date(i64::MIN, -3600), Err(EngineError::DataFormat(_))));
    }

    #[test]
    fn test_chart_url_joins_base() {
        let provider = YahooChartProvider::with_client("http://localhost:1234/", Client::new());
        let url = provider.chart_url("RELIANCE.NS").unwrap();
        assert_eq!(url.as_str(), "http://localhost:1234/v8/finance/chart/RELIANCE.NS");

        let provider = YahooChartProvider::with_client("not a url", Client::new());
        assert!(matches!(provider.chart_url("X"), Err(EngineError::Config(_))));
    }
}
