// Terminal renderings of an RSI report
use super::RsiReport;
use crate::error::Result;
use std::fmt::Write;

const UNDEFINED: &str = "-";

/// Fixed-width table of the last `tail` rows (all rows when `None`), followed by a summary line.
pub fn table(report: &RsiReport, tail: Option<usize>) -> String {
    let mut out = String::new();
    let rows = report.tail(tail);

    // Writing into a String cannot fail
    let _ = writeln!(out, "{} {}", report.symbol, report.indicator);
    let _ = writeln!(out, "{:<10}  {:>12}  {:>8}", "Date", "Close", "RSI");
    let _ = writeln!(out, "{}", "-".repeat(34));
    for row in rows {
        let rsi = row.rsi.map(|v| format!("{:.2}", v)).unwrap_or_else(|| UNDEFINED.to_string());
        let _ = writeln!(out, "{:<10}  {:>12.2}  {:>8}", row.date.format("%Y-%m-%d"), row.close, rsi);
    }
    if rows.len() < report.rows.len() {
        let _ = writeln!(out, "({} of {} rows shown)", rows.len(), report.rows.len());
    }

    match report.latest() {
        Some(latest) => {
            let _ = writeln!(
                out,
                "Latest {} on {}: {:.2} ({})",
                report.indicator,
                latest.date.format("%Y-%m-%d"),
                latest.rsi,
                latest.zone
            );
        }
        None => {
            let _ = writeln!(
                out,
                "Not enough history for {}: {} rows, need at least {}",
                report.indicator,
                report.rows.len(),
                report.window + 1
            );
        }
    }
    out
}

/// Pretty JSON with the summary and every row; undefined RSI values are `null`.
pub fn json(report: &RsiReport) -> Result<String> {
    let value = serde_json::json!({
        "symbol": report.symbol,
        "indicator": report.indicator,
        "window": report.window,
        "thresholds": report.thresholds,
        "latest": report.latest(),
        "rows": report.rows,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
