//! Utility functions for request-snapshot
//!
//! Small leaf helpers used by the normalizer: header-name normalization,
//! cookie parsing, field-name snake-casing, and the best-effort date and
//! duration parsers whose failures are swallowed (logged at debug level,
//! field omitted).

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::percent_decode_str;
use tracing::debug;

/// Lower-case all header names, collapsing case-insensitive duplicates
/// (collision order is unspecified, matching the input map's iteration).
pub fn lower_case_headers(headers: &HashMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect()
}

/// Parse a `cookie` header into a flat name/value map.
///
/// First occurrence of a name wins. Values are percent-decoded best-effort;
/// a value that does not decode as UTF-8 is kept verbatim.
pub fn parse_cookies(header: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches('"');
        let decoded = percent_decode_str(value)
            .decode_utf8()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| value.to_string());
        cookies.entry(name.to_string()).or_insert(decoded);
    }
    cookies
}

/// Normalize a field name to snake case: case boundaries and any run of
/// non-alphanumeric characters become a single underscore.
///
/// `productId`, `productID`, `product-id`, and `product[id]` all normalize
/// to `product_id`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        let boundary = i > 0
            && c.is_uppercase()
            && (chars[i - 1].is_lowercase()
                || chars[i - 1].is_ascii_digit()
                || (chars[i - 1].is_uppercase()
                    && chars.get(i + 1).is_some_and(|next| next.is_lowercase())));
        if boundary && !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Render an epoch-milliseconds value as an ISO-8601 timestamp.
pub fn iso_from_epoch_millis(millis: i64) -> Option<String> {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => Some(iso_8601(&dt)),
        None => {
            debug!(millis, "epoch milliseconds out of range");
            None
        }
    }
}

/// ISO-8601 with millisecond precision in UTC, e.g. `2024-01-15T10:30:00.000Z`.
pub fn iso_8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an HTTP date header (RFC 2822, falling back to RFC 3339) into an
/// ISO-8601 string. Unparseable input is logged and dropped.
pub fn parse_http_date(value: &str) -> Option<String> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| iso_8601(&dt.with_timezone(&Utc)))
        .map_err(|err| debug!(value, error = %err, "unparseable date header"))
        .ok()
}

/// Parse a human-readable duration (`500 ms`, `1.5s`, `2m`, bare millis)
/// into fractional milliseconds. Unknown units are logged and dropped.
pub fn parse_duration_millis(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let unit_start = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(unit_start);
    let number: f64 = match number.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            debug!(value, "unparseable duration value");
            return None;
        }
    };
    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        _ => {
            debug!(value, "unknown duration unit");
            return None;
        }
    };
    let millis = number * multiplier;
    millis.is_finite().then_some(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_case_headers() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer x".to_string());
        headers.insert("X-Request-Id".to_string(), "abc".to_string());
        let lowered = lower_case_headers(&headers);
        assert_eq!(lowered["authorization"], "Bearer x");
        assert_eq!(lowered["x-request-id"], "abc");
        assert!(!lowered.contains_key("Authorization"));
    }

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("foo=bar; beep=boop");
        assert_eq!(cookies["foo"], "bar");
        assert_eq!(cookies["beep"], "boop");
    }

    #[test]
    fn test_parse_cookies_first_occurrence_wins() {
        let cookies = parse_cookies("foo=first; foo=second");
        assert_eq!(cookies["foo"], "first");
    }

    #[test]
    fn test_parse_cookies_decodes_and_tolerates_junk() {
        let cookies = parse_cookies("next=%2Fhome; malformed; q=\"quoted\"");
        assert_eq!(cookies["next"], "/home");
        assert_eq!(cookies["q"], "quoted");
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_to_snake_case_variants() {
        assert_eq!(to_snake_case("product_id"), "product_id");
        assert_eq!(to_snake_case("product-id"), "product_id");
        assert_eq!(to_snake_case("product[id]"), "product_id");
        assert_eq!(to_snake_case("productId"), "product_id");
        assert_eq!(to_snake_case("productID"), "product_id");
        assert_eq!(to_snake_case("HTMLParser"), "html_parser");
        assert_eq!(to_snake_case("card[number]"), "card_number");
        assert_eq!(to_snake_case("ID"), "id");
    }

    #[test]
    fn test_parse_http_date_formats() {
        let rfc2822 = parse_http_date("Tue, 10 Jun 2014 07:19:27 GMT").unwrap();
        assert_eq!(rfc2822, "2014-06-10T07:19:27.000Z");
        let rfc3339 = parse_http_date("2014-06-10T07:19:27.000Z").unwrap();
        assert_eq!(rfc3339, "2014-06-10T07:19:27.000Z");
        assert!(parse_http_date("not a date").is_none());
    }

    #[test]
    fn test_iso_from_epoch_millis() {
        assert_eq!(
            iso_from_epoch_millis(1402384767000).as_deref(),
            Some("2014-06-10T07:19:27.000Z")
        );
    }

    #[test]
    fn test_parse_duration_millis() {
        assert_eq!(parse_duration_millis("500 ms"), Some(500.0));
        assert_eq!(parse_duration_millis("500ms"), Some(500.0));
        assert_eq!(parse_duration_millis("1.5s"), Some(1500.0));
        assert_eq!(parse_duration_millis("2m"), Some(120_000.0));
        assert_eq!(parse_duration_millis("250"), Some(250.0));
        assert_eq!(parse_duration_millis("12.345ms"), Some(12.345));
        assert_eq!(parse_duration_millis("fast"), None);
        assert_eq!(parse_duration_millis("10 parsecs"), None);
    }
}
