// Parsing and formatting helpers.
//
// Count cells are parsed strictly here so the loader can reject a bad row
// instead of coercing it; everything displayed goes through the
// `num-format` wrappers below.
use num_format::{Locale, ToFormattedString};

/// Why a count cell was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountParseError {
    Missing,
    Invalid,
}

/// Parse a CSV cell holding an application count.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace; an empty cell counts as missing.
/// - Only plain decimal digits are accepted: no sign, no decimal point,
///   no thousands separators.
pub fn parse_count(s: Option<&str>) -> Result<u64, CountParseError> {
    let s = s.map(str::trim).unwrap_or("");
    if s.is_empty() {
        return Err(CountParseError::Missing);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CountParseError::Invalid);
    }
    // Digits only, so the remaining failure mode is overflow.
    s.parse::<u64>().map_err(|_| CountParseError::Invalid)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Percentage with one decimal, or a dash when undefined.
pub fn format_pct(p: Option<f64>) -> String {
    match p {
        Some(v) => format!("{}%", format_number(v, 1)),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_accepts_trimmed_digits() {
        assert_eq!(parse_count(Some(" 42 ")), Ok(42));
        assert_eq!(parse_count(Some("0")), Ok(0));
    }

    #[test]
    fn parse_count_rejects_empty_as_missing() {
        assert_eq!(parse_count(None), Err(CountParseError::Missing));
        assert_eq!(parse_count(Some("   ")), Err(CountParseError::Missing));
    }

    #[test]
    fn parse_count_rejects_non_integers() {
        for bad in ["abc", "-3", "+3", "1.5", "1,000", "12x", "99999999999999999999999"] {
            assert_eq!(parse_count(Some(bad)), Err(CountParseError::Invalid), "{bad}");
        }
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_int(1_234_567u64), "1,234,567");
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_number(-0.25, 2), "-0.25");
        assert_eq!(format_number(7.0, 0), "7");
    }

    #[test]
    fn formats_missing_percentage_as_dash() {
        assert_eq!(format_pct(Some(70.0)), "70.0%");
        assert_eq!(format_pct(None), "-");
    }
}
