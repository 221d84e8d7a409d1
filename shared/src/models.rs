use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("close at {date} must be a positive finite number, got {close}")]
    InvalidClose { date: NaiveDate, close: f64 },

    #[error("dates must be strictly increasing: {current} follows {previous}")]
    NotIncreasing { previous: NaiveDate, current: NaiveDate },

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes for one symbol, ordered by date with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points that are already in order.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(SeriesError::InvalidClose { date: point.date, close: point.close });
            }
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing { previous: pair[0].date, current: pair[1].date });
            }
        }
        Ok(Self { symbol: symbol.into(), points })
    }

    /// Sorts by date and keeps the last point seen for each date before validating.
    /// Providers hand raw rows here.
    pub fn from_unordered(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        // Stable sort keeps arrival order within a date, so reversing lets dedup keep the latest row.
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    pub date: NaiveDate,
    /// `None` where there is not enough history or the window was flat.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiSeries {
    pub window: usize,
    pub points: Vec<RsiPoint>,
}

impl RsiSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Most recent defined value, with its date.
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points.iter().rev().find_map(|p| p.value.map(|v| (p.date, v)))
    }

    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Interval::Day1),
            "1wk" => Ok(Interval::Week1),
            "1mo" => Ok(Interval::Month1),
            other => Err(SeriesError::UnknownVariant { kind: "interval", value: other.to_string() }),
        }
    }
}

/// How far back to request history, counted from today (or the latest available row).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum HistoryRange {
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
    #[serde(rename = "6mo")]
    Month6,
    #[serde(rename = "1y")]
    Year1,
    #[default]
    #[serde(rename = "2y")]
    Year2,
    #[serde(rename = "5y")]
    Year5,
    #[serde(rename = "10y")]
    Year10,
    #[serde(rename = "max")]
    Max,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::Month1 => "1mo",
            HistoryRange::Month3 => "3mo",
            HistoryRange::Month6 => "6mo",
            HistoryRange::Year1 => "1y",
            HistoryRange::Year2 => "2y",
            HistoryRange::Year5 => "5y",
            HistoryRange::Year10 => "10y",
            HistoryRange::Max => "max",
        }
    }

    /// Span in calendar months, `None` for `Max`.
    pub fn months(&self) -> Option<u32> {
        match self {
            HistoryRange::Month1 => Some(1),
            HistoryRange::Month3 => Some(3),
            HistoryRange::Month6 => Some(6),
            HistoryRange::Year1 => Some(12),
            HistoryRange::Year2 => Some(24),
            HistoryRange::Year5 => Some(60),
            HistoryRange::Year10 => Some(120),
            HistoryRange::Max => None,
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(HistoryRange::Month1),
            "3mo" => Ok(HistoryRange::Month3),
            "6mo" => Ok(HistoryRange::Month6),
            "1y" => Ok(HistoryRange::Year1),
            "2y" => Ok(HistoryRange::Year2),
            "5y" => Ok(HistoryRange::Year5),
            "10y" => Ok(HistoryRange::Year10),
            "max" => Ok(HistoryRange::Max),
            other => Err(SeriesError::UnknownVariant { kind: "range", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub symbol: String,
    pub range: HistoryRange,
    pub interval: Interval,
}

impl HistoryRequest {
    pub fn new(symbol: impl Into<String>, range: HistoryRange, interval: Interval) -> Self {
        Self { symbol: symbol.into(), range, interval }
    }

    /// Daily bars over two years.
    pub fn daily(symbol: impl Into<String>) -> Self {
        Self::new(symbol, HistoryRange::default(), Interval::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_price_series_rejects_non_positive_close() {
        let err = PriceSeries::new("TEST", vec![PricePoint::new(date(2024, 1, 2), 0.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidClose { .. }));

        let err = PriceSeries::new("TEST", vec![PricePoint::new(date(2024, 1, 2), f64::NAN)]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidClose { .. }));
    }

    #[test]
    fn test_price_series_rejects_duplicate_dates() {
        let points = vec![PricePoint::new(date(2024, 1, 2), 10.0), PricePoint::new(date(2024, 1, 2), 11.0)];
        let err = PriceSeries::new("TEST", points).unwrap_err();
        assert!(matches!(err, SeriesError::NotIncreasing { .. }));
    }

    #[test]
    fn test_from_unordered_sorts_and_keeps_latest_duplicate() {
        let points = vec![
            PricePoint::new(date(2024, 1, 3), 12.0),
            PricePoint::new(date(2024, 1, 2), 10.0),
            PricePoint::new(date(2024, 1, 3), 13.0),
        ];
        let series = PriceSeries::from_unordered("TEST", points).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 13.0]);
        assert_eq!(series.first_date(), Some(date(2024, 1, 2)));
        assert_eq!(series.last_date(), Some(date(2024, 1, 3)));
    }

    #[test]
    fn test_rsi_series_latest_skips_undefined_tail() {
        let series = RsiSeries {
            window: 2,
            points: vec![
                RsiPoint { date: date(2024, 1, 2), value: None },
                RsiPoint { date: date(2024, 1, 3), value: Some(55.0) },
                RsiPoint { date: date(2024, 1, 4), value: None },
            ],
        };
        assert_eq!(series.latest(), Some((date(2024, 1, 3), 55.0)));
        assert_eq!(series.defined_count(), 1);
    }

    #[test]
    fn test_range_and_interval_parse() {
        assert_eq!("2Y".parse::<HistoryRange>().unwrap(), HistoryRange::Year2);
        assert_eq!("max".parse::<HistoryRange>().unwrap().months(), None);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Week1);
        assert!("2d".parse::<Interval>().is_err());
    }

    #[test]
    fn test_range_serde_uses_wire_names() {
        let json = serde_json::to_string(&HistoryRange::Month6).unwrap();
        assert_eq!(json, "\"6mo\"");
        let interval: Interval = serde_json::from_str("\"1mo\"").unwrap();
        assert_eq!(interval, Interval::Month1);
    }
}
