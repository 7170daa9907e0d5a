//! Display helpers
//!
//! Locale-neutral formatting for the few values the core renders itself.

/// Placeholder for values that are not available
pub const NOT_AVAILABLE: &str = "—";

/// Format milliseconds as `HHhMMmSSs`. Negative input clamps to zero.
pub fn format_elapsed(ms: i64) -> String {
    let total = ms.max(0) / 1000;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}h{:02}m{:02}s", h, m, s)
}

/// Format a number with at most `decimals` fraction digits, trailing zeros trimmed
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}

/// Format an optional value, rendering `None` and non-finite values as "—"
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00h00m00s");
        assert_eq!(format_elapsed(3_725_999), "01h02m05s");
        assert_eq!(format_elapsed(-5_000), "00h00m00s");
        assert_eq!(format_elapsed(100 * 3_600_000), "100h00m00s");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0, 2), "15");
        assert_eq!(format_number(14.25, 2), "14.25");
        assert_eq!(format_number(9.5, 2), "9.5");
        assert_eq!(format_number(f64::NAN, 2), "—");
        assert_eq!(format_optional(None, 2), "—");
        assert_eq!(format_optional(Some(0.0899), 2), "0.09");
    }
}
