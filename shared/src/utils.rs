// Number parsing helpers shared by data loaders.

pub mod decimal_format {
    use std::num::ParseFloatError;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    pub enum DecimalError {
        #[error("misplaced thousands separator in '{0}'")]
        Grouping(String),
        #[error(transparent)]
        Parse(#[from] ParseFloatError),
    }

    /// Parses decimal-comma numbers such as "1.234,56" or "123,45".
    pub fn parse_decimal_comma(s: &str) -> Result<f64, DecimalError> {
        Ok(ungroup(s, '.', ',')?.parse::<f64>()?)
    }

    /// Parses decimal-point numbers, tolerating "," thousand separators ("1,234.56").
    pub fn parse_decimal_point(s: &str) -> Result<f64, DecimalError> {
        Ok(ungroup(s, ',', '.')?.parse::<f64>()?)
    }

    pub fn parse_decimal(s: &str, decimal_comma: bool) -> Result<f64, DecimalError> {
        if decimal_comma {
            parse_decimal_comma(s)
        } else {
            parse_decimal_point(s)
        }
    }

    // Drops thousand separators and rewrites the decimal mark as '.'.
    // Separators must split the integer part into groups of exactly three digits,
    // so "1,5" in a decimal-point file is an error rather than 15.
    fn ungroup(s: &str, separator: char, decimal: char) -> Result<String, DecimalError> {
        let s = s.trim();
        let grouping_error = || DecimalError::Grouping(s.to_string());
        let (integer, fraction) = match s.split_once(decimal) {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (s, None),
        };
        if fraction.is_some_and(|f| f.contains(separator)) {
            return Err(grouping_error());
        }

        let mut groups = integer.split(separator);
        let lead = groups.next().unwrap_or_default();
        let mut normalized = lead.to_string();
        let mut grouped = false;
        for group in groups {
            grouped = true;
            if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
                return Err(grouping_error());
            }
            normalized.push_str(group);
        }
        if grouped {
            let digits = lead.trim_start_matches(|c: char| c == '-' || c == '+');
            if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(grouping_error());
            }
        }

        if let Some(fraction) = fraction {
            normalized.push('.');
            normalized.push_str(fraction);
        }
        Ok(normalized)
    }

}
