use rsi_shared::SeriesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No price data found for symbol '{0}'")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// True for failures caused by what the caller asked for, as opposed to the data source.
    pub fn is_user_error(&self) -> bool {
        matches!(self, EngineError::InvalidArgument(_) | EngineError::NotFound(_) | EngineError::Config(_))
    }
}

impl From<SeriesError> for EngineError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::UnknownVariant { .. } => EngineError::InvalidArgument(err.to_string()),
            other => EngineError::DataFormat(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        tracing::debug!(error = ?err, "HTTP client error");
        if err.is_decode() {
            EngineError::DataFormat(format!("Malformed response body: {}", err))
        } else {
            EngineError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_series_error_mapping() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err: EngineError = SeriesError::InvalidClose { date, close: -1.0 }.into();
        assert!(matches!(err, EngineError::DataFormat(_)));

        let err: EngineError = SeriesError::UnknownVariant { kind: "range", value: "7y".into() }.into();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_not_found_message_names_symbol() {
        let err = EngineError::NotFound("FOO.NS".to_string());
        assert_eq!(err.to_string(), "No price data found for symbol 'FOO.NS'");
    }
}
