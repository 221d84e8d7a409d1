// Local CSV price history: one `<SYMBOL>.csv` file per ticker
use super::{normalize_symbol, PriceHistoryProvider};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use rsi_shared::utils::decimal_format;
use rsi_shared::{HistoryRange, HistoryRequest, Interval, PricePoint, PriceSeries};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    pub delimiter: u8,
    /// Numbers written as "1.234,56" instead of "1,234.56".
    pub decimal_comma: bool,
    pub date_format: String,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            decimal_comma: false,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

pub struct CsvPriceProvider {
    data_dir: PathBuf,
    format: CsvFormat,
}

impl CsvPriceProvider {
    pub fn new(data_dir: impl Into<PathBuf>, format: CsvFormat) -> Self {
        Self { data_dir: data_dir.into(), format }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    // Prefers `<SYMBOL>.csv`; falls back to the file named as the symbol was typed
    fn locate(&self, symbol: &str, typed: &str) -> PathBuf {
        let path = self.path_for(symbol);
        if !path.exists() && typed != symbol {
            let typed_path = self.path_for(typed);
            if typed_path.exists() {
                return typed_path;
            }
        }
        path
    }

    // Header: Date,Open,High,Low,Close,Adj Close,Volume (only Date and Close are required)
    // Example Row: 2024-01-02,2580.00,2610.50,2575.10,2604.55,2604.55,5120331
    pub fn load_points<R: Read>(reader: R, format: &CsvFormat) -> Result<Vec<PricePoint>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let date_pos = Self::column(&headers, "Date")?;
        let close_pos = Self::column(&headers, "Close")?;

        let mut points = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result
                .map_err(|e| EngineError::DataFormat(format!("Error reading CSV record at line {}: {}", line, e)))?;

            let date_str = Self::field(&record, date_pos)
                .ok_or_else(|| EngineError::DataFormat(format!("Missing 'Date' field in CSV record at line {}", line)))?;
            let close_str = Self::field(&record, close_pos)
                .ok_or_else(|| EngineError::DataFormat(format!("Missing 'Close' field in CSV record at line {}", line)))?;

            // Exports mark non-trading days with "null"; skip them like the HTTP source does.
            if close_str.eq_ignore_ascii_case("null") {
                tracing::debug!(line, "Skipping row without a close");
                continue;
            }

            let date = NaiveDate::parse_from_str(date_str, &format.date_format)
                .map_err(|e| EngineError::DataFormat(format!("Error parsing 'Date' at line {}: '{}': {}", line, date_str, e)))?;
            let close = decimal_format::parse_decimal(close_str, format.decimal_comma)
                .map_err(|e| EngineError::DataFormat(format!("Error parsing 'Close' at line {}: '{}': {}", line, close_str, e)))?;

            points.push(PricePoint::new(date, close));
        }
        Ok(points)
    }

    pub fn load_file(path: &Path, format: &CsvFormat) -> Result<Vec<PricePoint>> {
        let file = File::open(path)?;
        Self::load_points(BufReader::new(file), format)
    }

    // Header names are matched case-insensitively
    fn column(headers: &StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::DataFormat(format!("Missing '{}' column in CSV header", name)))
    }

    fn field(record: &StringRecord, pos: usize) -> Option<&str> {
        record.get(pos).filter(|s| !s.is_empty())
    }
}

/// Keeps rows within `range` of the latest row.
pub fn apply_range(points: Vec<PricePoint>, range: HistoryRange) -> Vec<PricePoint> {
    let (Some(months), Some(last)) = (range.months(), points.iter().map(|p| p.date).max()) else {
        return points;
    };
    match last.checked_sub_months(Months::new(months)) {
        Some(start) => points.into_iter().filter(|p| p.date > start).collect(),
        None => points,
    }
}

/// Collapses ordered daily rows to the last close of each week or month.
pub fn resample(points: Vec<PricePoint>, interval: Interval) -> Vec<PricePoint> {
    if interval == Interval::Day1 {
        return points;
    }
    let bucket = |date: NaiveDate| -> (i32, u32) {
        match interval {
            Interval::Day1 => (date.year(), date.ordinal()),
            Interval::Week1 => (date.iso_week().year(), date.iso_week().week()),
            Interval::Month1 => (date.year(), date.month()),
        }
    };

    let mut results: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match results.last_mut() {
            Some(last) if bucket(last.date) == bucket(point.date) => *last = point,
            _ => results.push(point),
        }
    }
    results
}

#[async_trait]
impl PriceHistoryProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self, request: &HistoryRequest) -> Result<PriceSeries> {
        let symbol = normalize_symbol(&request.symbol)?;
        let path = self.locate(&symbol, request.symbol.trim());
        tracing::info!(symbol = %symbol, path = %path.display(), "Loading price history from CSV");

        let points = match Self::load_file(&path, &self.format) {
            Ok(points) => points,
            Err(EngineError::Io { source }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(symbol = %symbol, path = %path.display(), "No CSV file for symbol");
                return Err(EngineError::NotFound(symbol));
            }
            Err(e) => return Err(e),
        };

        // Sort and dedup before resampling, which expects ordered rows.
        let ordered = PriceSeries::from_unordered(symbol.clone(), points)?;
        let points = resample(apply_range(ordered.points().to_vec(), request.range), request.interval);
        if points.is_empty() {
            tracing::warn!(symbol = %symbol, "CSV file has no price rows");
            return Err(EngineError::NotFound(symbol));
        }

        let series = PriceSeries::new(symbol, points)?;
        tracing::debug!(symbol = %series.symbol(), rows = series.len(), "Loaded CSV price history");
        Ok(series)
    }
}
