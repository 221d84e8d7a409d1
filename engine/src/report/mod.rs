// Price and RSI rows joined for display and export
pub mod export;
pub mod render;

use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use rsi_shared::{PriceSeries, RsiSeries};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Overbought,
    Neutral,
    Oversold,
}

impl Zone {
    pub fn classify(rsi: f64, thresholds: &Thresholds) -> Self {
        if rsi >= thresholds.overbought {
            Zone::Overbought
        } else if rsi <= thresholds.oversold {
            Zone::Oversold
        } else {
            Zone::Neutral
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Zone::Overbought => "overbought",
            Zone::Neutral => "neutral",
            Zone::Oversold => "oversold",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { overbought: 70.0, oversold: 30.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Latest {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: f64,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiReport {
    pub symbol: String,
    pub indicator: String,
    pub window: usize,
    pub thresholds: Thresholds,
    pub rows: Vec<ReportRow>,
}

impl RsiReport {
    pub fn new(indicator: impl Into<String>, prices: &PriceSeries, rsi: &RsiSeries, thresholds: Thresholds) -> Result<Self> {
        if prices.len() != rsi.len() {
            return Err(EngineError::InvalidArgument(format!(
                "RSI series has {} entries for {} prices",
                rsi.len(),
                prices.len()
            )));
        }

        let mut rows = Vec::with_capacity(prices.len());
        for (price, point) in prices.points().iter().zip(&rsi.points) {
            if price.date != point.date {
                return Err(EngineError::InvalidArgument(format!(
                    "RSI date {} does not match price date {}",
                    point.date, price.date
                )));
            }
            rows.push(ReportRow { date: price.date, close: price.close, rsi: point.value });
        }

        Ok(Self {
            symbol: prices.symbol().to_string(),
            indicator: indicator.into(),
            window: rsi.window,
            thresholds,
            rows,
        })
    }

    /// Last row with a defined RSI.
    pub fn latest(&self) -> Option<Latest> {
        self.rows.iter().rev().find_map(|row| {
            row.rsi.map(|rsi| Latest {
                date: row.date,
                close: row.close,
                rsi,
                zone: Zone::classify(rsi, &self.thresholds),
            })
        })
    }

    pub fn defined_count(&self) -> usize {
        self.rows.iter().filter(|row| row.rsi.is_some()).count()
    }

    pub fn tail(&self, count: Option<usize>) -> &[ReportRow] {
        match count {
            Some(n) if n < self.rows.len() => &self.rows[self.rows.len() - n..],
            _ => &self.rows,
        }
    }
}
