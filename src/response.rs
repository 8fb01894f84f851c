//! Response head parsing
//!
//! Parses a raw response head — an optional HTTP status line followed by
//! header lines — into a structured form. Parsing is best-effort throughout:
//! a malformed or absent status line degrades to headers-only, lines without
//! a colon are skipped, and the body after the blank line is ignored.

use std::collections::HashMap;

/// Parsed response head. All status-line fields are independent best-effort
/// parses; headers keep their original casing (normalization happens later,
/// together with masking).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseHead {
    pub version: Option<(u16, u16)>,
    pub status_code: Option<u16>,
    pub reason_phrase: Option<String>,
    pub headers: HashMap<String, String>,
}

/// Parse a raw status-line-plus-headers text blob.
pub fn parse_response_head(text: &str) -> ResponseHead {
    let mut head = ResponseHead::default();

    // everything after the first blank line is body
    let header_block = text
        .split("\r\n\r\n")
        .next()
        .and_then(|block| block.split("\n\n").next())
        .unwrap_or(text);

    for (i, line) in header_block.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if i == 0 && line.starts_with("HTTP/") {
            parse_status_line(line, &mut head);
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        head.headers
            .insert(name.to_string(), value.trim().to_string());
    }

    head
}

fn parse_status_line(line: &str, head: &mut ResponseHead) {
    let rest = match line.strip_prefix("HTTP/") {
        Some(rest) => rest,
        None => return,
    };
    let mut parts = rest.splitn(3, ' ');

    if let Some(version) = parts.next() {
        if let Some((major, minor)) = version.split_once('.') {
            if let (Ok(major), Ok(minor)) = (major.parse(), minor.parse()) {
                head.version = Some((major, minor));
            }
        }
    }

    head.status_code = parts.next().and_then(|code| code.parse().ok());

    head.reason_phrase = parts
        .next()
        .map(|reason| reason.trim().to_string())
        .filter(|reason| !reason.is_empty());
}
