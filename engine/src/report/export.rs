// Spreadsheet-friendly CSV export of an RSI report
use super::RsiReport;
use crate::error::Result;
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 3] = ["Date", "Close", "RSI"];

/// Serializes the report as `Date,Close,RSI` rows. Undefined RSI values are empty cells.
pub fn to_csv_bytes(report: &RsiReport) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in &report.rows {
        let date = row.date.format("%Y-%m-%d").to_string();
        let close = row.close.to_string();
        let rsi = row.rsi.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([date.as_str(), close.as_str(), rsi.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()).into())
}

/// "RELIANCE.NS" -> "RELIANCE.NS_RSI.csv"
pub fn default_file_name(symbol: &str) -> String {
    format!("{}_RSI.csv", symbol)
}

/// Writes the report into `dir` under its default file name and returns the path written.
pub fn write_report(report: &RsiReport, dir: &Path) -> Result<PathBuf> {
    let bytes = to_csv_bytes(report)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(default_file_name(&report.symbol));
    fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "Wrote RSI export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;
    use tempfile::TempDir;

    #[test]
    fn test_to_csv_bytes_blank_for_undefined() {
        let report = sample_report(&[10.0, 11.0, 12.5], 2);
        let text = String::from_utf8(to_csv_bytes(&report).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Date,Close,RSI", "2024-01-01,10,", "2024-01-02,11,", "2024-01-03,12.5,100"]);
    }

    #[test]
    fn test_to_csv_bytes_flat_window_is_blank() {
        let report = sample_report(&[10.0, 10.0, 10.0], 2);
        let text = String::from_utf8(to_csv_bytes(&report).unwrap()).unwrap();
        assert_eq!(text.lines().last(), Some("2024-01-03,10,"));
    }

    #[test]
    fn test_to_csv_bytes_reads_back() {
        let report = sample_report(&[10.0, 10.5, 10.2, 10.9, 11.4], 3);
        let bytes = to_csv_bytes(&report).unwrap();
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let rsi: Vec<Option<f64>> = rdr
            .records()
            .map(|r| {
                let record = r.unwrap();
                let cell = record.get(2).unwrap();
                if cell.is_empty() { None } else { Some(cell.parse().unwrap()) }
            })
            .collect();
        let expected: Vec<Option<f64>> = report.rows.iter().map(|row| row.rsi).collect();
        assert_eq!(rsi, expected);
    }

    #[test]
    fn test_write_report_uses_symbol_file_name() {
        let dir = TempDir::new().unwrap();
        let report = sample_report(&[10.0, 11.0], 1);
        let path = write_report(&report, &dir.path().join("out")).unwrap();
        assert_eq!(path.file_name().unwrap(), "TEST.NS_RSI.csv");
        let written = fs::read(&path).unwrap();
        assert_eq!(written, to_csv_bytes(&report).unwrap());
    }
}
