//! Display Formatting
//!
//! Pure helpers that turn raw backend values into display strings.
//! Every function here is total: missing values become an empty string and
//! nothing panics.

use serde_json::Value;

/// Format a count as a grouped integer (`1234567` -> `"1,234,567"`).
///
/// `null` yields an empty string, numeric strings are parsed, anything else
/// non-numeric is returned as its plain string form.
pub fn format_count(x: &Value) -> String {
    match numeric(x) {
        Numeric::Missing => String::new(),
        Numeric::Number(n) => group_thousands(n),
        Numeric::Other(raw) => raw,
    }
}

/// Format a fractional share in `[0,1]` as a percentage with two decimals.
pub fn format_share(x: &Value) -> String {
    match numeric(x) {
        Numeric::Missing => String::new(),
        Numeric::Number(n) => share(n),
        Numeric::Other(raw) => raw,
    }
}

/// Lift ratio with two decimals and a trailing `x`; empty when absent.
pub fn lift(x: &Value) -> String {
    match numeric(x) {
        Numeric::Missing => String::new(),
        Numeric::Number(n) => format!("{:.2}x", n),
        Numeric::Other(raw) => raw,
    }
}

/// Numeric reading of a raw value: numbers as-is, numeric strings parsed.
pub fn number(x: &Value) -> Option<f64> {
    match numeric(x) {
        Numeric::Number(n) => Some(n),
        _ => None,
    }
}

/// Truncate a period key to its 7-character calendar month (`2024-03`).
pub fn month_label(key: &str) -> &str {
    match key.char_indices().nth(7) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

/// `"<first> → <last>"` with missing ends rendered empty.
pub fn date_range(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} → {}", first.unwrap_or(""), last.unwrap_or(""))
}

enum Numeric {
    Missing,
    Number(f64),
    Other(String),
}

fn numeric(x: &Value) -> Numeric {
    match x {
        Value::Null => Numeric::Missing,
        Value::Number(n) => match n.as_f64() {
            Some(f) => Numeric::Number(f),
            None => Numeric::Other(n.to_string()),
        },
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Numeric::Number(f),
            _ => Numeric::Other(s.clone()),
        },
        Value::Bool(b) => Numeric::Other(b.to_string()),
        other => Numeric::Other(other.to_string()),
    }
}

/// An already-decoded share in `[0,1]` as a percentage.
pub fn share(n: f64) -> String {
    format!("{:.2}%", n * 100.0)
}

fn group_thousands(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let rounded = n.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_count_groups_thousands() {
        assert_eq!(format_count(&json!(1234567)), "1,234,567");
        assert_eq!(format_count(&json!(999)), "999");
        assert_eq!(format_count(&json!(1000)), "1,000");
        assert_eq!(format_count(&json!(0)), "0");
        assert_eq!(format_count(&json!(-45210)), "-45,210");
    }

    #[test]
    fn test_format_count_rounds_fractions() {
        assert_eq!(format_count(&json!(1234.6)), "1,235");
        assert_eq!(format_count(&json!(0.4)), "0");
    }

    #[test]
    fn test_format_count_missing_and_non_numeric() {
        assert_eq!(format_count(&Value::Null), "");
        assert_eq!(format_count(&json!("n/a")), "n/a");
        assert_eq!(format_count(&json!("2500")), "2,500");
        assert_eq!(format_count(&json!(2.0)), "2");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(&json!(0.1234)), "12.34%");
        assert_eq!(format_share(&json!(0)), "0.00%");
        assert_eq!(format_share(&json!(1)), "100.00%");
        assert_eq!(format_share(&Value::Null), "");
        assert_eq!(share(0.05), "5.00%");
    }

    #[test]
    fn test_format_share_unit_interval_property() {
        for i in 0..=1000 {
            let x = i as f64 / 1000.0;
            let s = format_share(&json!(x));
            assert!(s.ends_with('%'));
            let parsed: f64 = s.trim_end_matches('%').parse().unwrap();
            assert!((parsed - x * 100.0).abs() <= 0.005 + 1e-9, "{} -> {}", x, s);
        }
    }

    #[test]
    fn test_lift_and_labels() {
        assert_eq!(lift(&json!(2.5)), "2.50x");
        assert_eq!(lift(&Value::Null), "");
        assert_eq!(number(&json!("0.5")), Some(0.5));
        assert_eq!(number(&json!("n/a")), None);
        assert_eq!(month_label("2024-03-01"), "2024-03");
        assert_eq!(month_label("2024"), "2024");
        assert_eq!(date_range(Some("2024-01-01"), None), "2024-01-01 → ");
    }
}
