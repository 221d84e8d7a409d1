// Application settings: defaults, then an optional JSON file, then environment overrides
use crate::data::yahoo::DEFAULT_BASE_URL;
use crate::data::CsvFormat;
use crate::error::{EngineError, Result};
use crate::indicators::DEFAULT_RSI_WINDOW;
use crate::report::Thresholds;
use rsi_shared::{HistoryRange, Interval};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "RSI_FETCHER_";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Csv,
}

impl std::str::FromStr for SourceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(SourceKind::Yahoo),
            "csv" => Ok(SourceKind::Csv),
            other => Err(EngineError::Config(format!("unknown source '{}', expected yahoo or csv", other))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RsiSettings {
    pub window: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            window: DEFAULT_RSI_WINDOW,
            overbought: thresholds.overbought,
            oversold: thresholds.oversold,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct YahooSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CsvSettings {
    pub data_dir: PathBuf,
    pub delimiter: String, // Should be a single byte, but a JSON string is easier to write
    pub decimal_comma: bool,
    pub date_format: String,
}

impl Default for CsvSettings {
    fn default() -> Self {
        let format = CsvFormat::default();
        Self {
            data_dir: PathBuf::from("data"),
            delimiter: (format.delimiter as char).to_string(),
            decimal_comma: format.decimal_comma,
            date_format: format.date_format,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { enabled: true, output_dir: PathBuf::from(".") }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub source: SourceKind,
    pub default_symbol: String,
    pub range: HistoryRange,
    pub interval: Interval,
    pub rsi: RsiSettings,
    pub yahoo: YahooSettings,
    pub csv: CsvSettings,
    pub export: ExportSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            source: SourceKind::default(),
            default_symbol: "RELIANCE.NS".to_string(),
            range: HistoryRange::default(),
            interval: Interval::default(),
            rsi: RsiSettings::default(),
            yahoo: YahooSettings::default(),
            csv: CsvSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl AppSettings {
    /// Defaults, overlaid by `path` when given, then by `RSI_FETCHER_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config '{}': {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::Config(format!("Invalid config JSON: {}", e)))
    }

    /// Applies overrides looked up through `lookup`, keyed by full variable name.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(source) = var("SOURCE") {
            self.source = source.parse()?;
        }
        if let Some(window) = var("WINDOW") {
            self.rsi.window = window
                .trim()
                .parse()
                .map_err(|e| EngineError::Config(format!("{}WINDOW='{}': {}", ENV_PREFIX, window, e)))?;
        }
        if let Some(dir) = var("DATA_DIR") {
            self.csv.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }
        if let Some(url) = var("YAHOO_URL") {
            self.yahoo.base_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.rsi.window == 0 {
            return Err(EngineError::Config("rsi.window must be a positive integer".to_string()));
        }
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.rsi.overbought) || !in_range(self.rsi.oversold) {
            return Err(EngineError::Config("rsi thresholds must lie within 0..=100".to_string()));
        }
        if self.rsi.oversold >= self.rsi.overbought {
            return Err(EngineError::Config(format!(
                "rsi.oversold ({}) must be below rsi.overbought ({})",
                self.rsi.oversold, self.rsi.overbought
            )));
        }
        if self.yahoo.timeout_secs == 0 {
            return Err(EngineError::Config("yahoo.timeout_secs must be positive".to_string()));
        }
        self.csv_format()?;
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds { overbought: self.rsi.overbought, oversold: self.rsi.oversold }
    }

    pub fn yahoo_timeout(&self) -> Duration {
        Duration::from_secs(self.yahoo.timeout_secs)
    }

    pub fn csv_format(&self) -> Result<CsvFormat> {
        let delimiter = match self.csv.delimiter.as_bytes() {
            [byte] => *byte,
            _ => {
                return Err(EngineError::Config(format!(
                    "csv.delimiter must be a single ASCII character, got '{}'",
                    self.csv.delimiter
                )))
            }
        };
        Ok(CsvFormat {
            delimiter,
            decimal_comma: self.csv.decimal_comma,
            date_format: self.csv.date_format.clone(),
        })
    }
}
