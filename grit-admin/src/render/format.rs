//! Value formatters shared by cells, widgets and exports

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

pub const RICHTEXT_PREVIEW_CHARS: usize = 100;

/// Display string of a JSON value the way a template would print it
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => plain_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Loose truthiness: `false`, `0`, `""` and `null` are false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric reading of a value; strings are parsed, everything else is `None`
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Print a float without a trailing `.0` for whole numbers
pub fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_fixed(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let rendered = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rendered, String::new()),
    };

    let mut frac = frac_part;
    while frac.len() > min_fraction && frac.ends_with('0') {
        frac.pop();
    }

    if frac.is_empty() {
        format!("{}{}", sign, group_thousands(&int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(&int_part), frac)
    }
}

/// en-US number formatting: thousands separators, up to 3 decimals
pub fn format_number(value: f64) -> String {
    format_fixed(value, 0, 3)
}

/// Prefix plus exactly two decimals (`$1,234.50`)
pub fn format_currency(value: f64, prefix: &str) -> String {
    let body = format_fixed(value.abs(), 2, 2);
    if value < 0.0 {
        format!("-{}{}", prefix, body)
    } else {
        format!("{}{}", prefix, body)
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{}%", plain_number(value))
}

/// Parse the timestamp shapes the API emits
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Absolute short date (`Mar 5, 2024`); unparseable input is returned as-is
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => value.to_string(),
    }
}

pub fn format_relative(value: &str) -> String {
    format_relative_at(value, Utc::now())
}

/// Relative-time bucket measured against `now`
pub fn format_relative_at(value: &str, now: DateTime<Utc>) -> String {
    let Some(date) = parse_timestamp(value) else {
        return value.to_string();
    };

    let diff_secs = (now - date).num_seconds();
    let diff_mins = diff_secs.div_euclid(60);
    let diff_hours = diff_mins.div_euclid(60);
    let diff_days = diff_hours.div_euclid(24);

    if diff_secs < 60 {
        "just now".to_string()
    } else if diff_mins < 60 {
        format!("{}m ago", diff_mins)
    } else if diff_hours < 24 {
        format!("{}h ago", diff_hours)
    } else if diff_days < 7 {
        format!("{}d ago", diff_days)
    } else if diff_days < 30 {
        format!("{}w ago", diff_days / 7)
    } else {
        format_date(value)
    }
}

/// Hostname of a URL, or the raw string when it does not parse
pub fn hostname(value: &str) -> String {
    url::Url::parse(value)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| value.to_string())
}

pub fn strip_html(value: &str) -> String {
    TAG_PATTERN.replace_all(value, "").trim().to_string()
}

/// Cut to `max` characters, appending `...` when something was dropped
pub fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let head: String = value.chars().take(max).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

/// Plain-text preview of an HTML fragment
pub fn richtext_preview(value: &str) -> String {
    truncate_chars(&strip_html(value), RICHTEXT_PREVIEW_CHARS)
}

/// Last path segment of a URL, used to name media in the terminal
pub fn file_name(value: &str) -> String {
    let without_query = value.split(['?', '#']).next().unwrap_or(value);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(value)
        .to_string()
}

/// Parse `#rgb` / `#rrggbb` into components
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn at(now: DateTime<Utc>, ago: Duration) -> String {
        (now - ago).to_rfc3339()
    }

    #[test]
    fn test_relative_boundaries() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative_at(&at(now, Duration::seconds(59)), now), "just now");
        assert_eq!(format_relative_at(&at(now, Duration::seconds(61)), now), "1m ago");
        assert_eq!(format_relative_at(&at(now, Duration::minutes(90)), now), "1h ago");
        assert_eq!(
            format_relative_at(&at(now, Duration::hours(7 * 24) - Duration::seconds(1)), now),
            "6d ago"
        );
        assert_eq!(format_relative_at(&at(now, Duration::hours(7 * 24)), now), "1w ago");
        assert_eq!(format_relative_at(&at(now, Duration::days(29)), now), "4w ago");
        assert_eq!(format_relative_at(&at(now, Duration::days(30)), now), "May 16, 2024");
    }

    #[test]
    fn test_future_timestamps_are_just_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative_at(&at(now, Duration::hours(-3)), now), "just now");
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date("2024-03-05T10:00:00Z"), "Mar 5, 2024");
        assert_eq!(format_date("2024-12-25"), "Dec 25, 2024");
        assert_eq!(format_date("2024-01-02 08:30:00"), "Jan 2, 2024");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn test_currency_and_numbers() {
        assert_eq!(format_currency(1234.5, "$"), "$1,234.50");
        assert_eq!(format_currency(0.0, "€"), "€0.00");
        assert_eq!(format_currency(-42.0, "$"), "-$42.00");
        assert_eq!(format_number(1234567.0), "1,234,567");
        assert_eq!(format_number(1.23456), "1.235");
        assert_eq!(format_percentage(12.5), "12.5%");
        assert_eq!(format_percentage(40.0), "40%");
    }

    #[test]
    fn test_hostname_falls_back_to_raw() {
        assert_eq!(hostname("https://docs.rs/serde/latest"), "docs.rs");
        assert_eq!(hostname("not a url"), "not a url");
    }

    #[test]
    fn test_richtext_preview() {
        assert_eq!(richtext_preview("  <p>Hello <b>world</b></p> "), "Hello world");
        let long = format!("<p>{}</p>", "a".repeat(120));
        let preview = richtext_preview(&long);
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_display_and_truthiness() {
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!([1, 2])), "1,2");
        assert!(truthy(&json!("false")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
    }

    #[test]
    fn test_file_name_and_colors() {
        assert_eq!(file_name("https://cdn.test/uploads/a/cat.png?x=1"), "cat.png");
        assert_eq!(parse_hex_color("#6c5ce7"), Some((0x6c, 0x5c, 0xe7)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("red"), None);
    }

    #[test]
    fn test_non_ascii_colors_are_rejected() {
        assert_eq!(parse_hex_color("#aébbb"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
        assert_eq!(parse_hex_color("#12345g"), None);
    }
}
