//! Request normalization
//!
//! [`parse_request`] assembles one [`Snapshot`] from one request-like input
//! plus configuration: headers are lower-cased and redacted, the URL is
//! rebuilt from its parts with a deterministically reserialized query, the
//! body and user record go through both masking passes, and timing and
//! correlation metadata are attached. Input objects are never mutated; every
//! output tree is rebuilt from the input.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use url::form_urlencoded;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::SnapshotError;
use crate::request::{RawRequest, RawResponse, RawUser};
use crate::response::{parse_response_head, ResponseHead};
use crate::sanitize::{mask_header_map, mask_props};
use crate::snapshot::{RequestSnapshot, ResponseSnapshot, Snapshot};
use crate::special::mask_special_types;
use crate::utils::{lower_case_headers, parse_cookies, parse_duration_millis, parse_http_date};
use crate::value::{safe_stringify, Value};

/// Normalize one request (and optional response) into a redacted snapshot.
///
/// The only hard error is supplying both `request` and `context`; every
/// data-shape problem degrades to an omitted field instead.
///
/// ```rust
/// use request_snapshot::{parse_request, Config, RawRequest, Value};
/// use serde_json::json;
///
/// let snapshot = parse_request(Config {
///     request: Some(RawRequest {
///         method: Some("POST".into()),
///         body: Some(Value::from(json!({ "password": "hello" }))),
///         ..Default::default()
///     }),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let body = snapshot.request.unwrap().body.unwrap();
/// assert_eq!(body, r#"{"password":"*****"}"#);
/// ```
pub fn parse_request(config: Config) -> Result<Snapshot, SnapshotError> {
    let started = Instant::now();
    let id = Uuid::now_v7();

    if config.request.is_some() && config.context.is_some() {
        return Err(SnapshotError::AmbiguousContext);
    }

    let has_request = config.request.is_some() || config.context.is_some();
    let view = RequestView::build(&config);

    let mask_options = config.mask_options();
    let special_options = config.special_type_options();

    // headers: lower-case names, then redact in header mode
    let headers = view
        .node
        .and_then(|node| node.headers.as_ref())
        .map(|raw| mask_header_map(&lower_case_headers(raw), &config.sanitize_headers));

    let method = view
        .method
        .map(str::to_string)
        .unwrap_or_else(|| "GET".to_string());

    // absolute URL and query mapping
    let mut url = None;
    let mut query = None;
    if let Some(original_url) = view.original_url {
        let (base, raw_query) = split_url(original_url);
        if config.parse_query {
            let pairs = parse_query_pairs(&raw_query);
            url = Some(format!("{base}{}", serialize_query(&pairs)));
            query = Some(mask_props(
                &pairs_to_value(pairs),
                &config.sanitize_fields,
                &mask_options,
            ));
        } else {
            // opt-out: raw query string passes through unchanged
            if raw_query.is_empty() {
                url = Some(base);
            } else {
                url = Some(format!("{base}?{raw_query}"));
            }
            query = Some(Value::String(raw_query));
        }
    }

    let user = resolve_user(view.user, view.ip, &config);

    // body: method-gated, special-masked, then redacted, then stringified
    let mut body = None;
    if config.parse_body && !matches!(method.as_str(), "GET" | "HEAD") {
        if let Some(raw_body) = view.body {
            let masked = if config.mask_buffers || config.mask_streams {
                mask_special_types(raw_body, &special_options)
            } else {
                raw_body.clone()
            };
            body = match mask_props(&masked, &config.sanitize_fields, &mask_options) {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(safe_stringify(&other)),
            };
        }
    }

    // cookies come from the already-redacted header value
    let cookies = headers
        .as_ref()
        .and_then(|h| h.get("cookie"))
        .filter(|value| !value.is_empty())
        .map(|value| parse_cookies(value));

    let (file, files) = resolve_files(&view, &config);

    let request_id = view.explicit_id.map(str::to_string).or_else(|| {
        headers
            .as_ref()
            .and_then(|h| h.get("x-request-id"))
            .cloned()
    });

    let http_version = view.node.and_then(resolve_http_version);

    let request_timestamp = view.node.and_then(resolve_received_timestamp);

    let response = resolve_response(config.response.as_ref(), &config.sanitize_headers);

    let request = has_request.then(|| RequestSnapshot {
        method,
        url,
        headers,
        cookies,
        query,
        body,
        file,
        files,
        id: request_id,
        http_version,
        timestamp: request_timestamp,
    });

    Ok(Snapshot {
        id: id.to_string(),
        timestamp: id_timestamp(&id),
        request,
        user,
        response,
        duration: started.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Compatibility wrapper for the older calling convention: a bare request
/// plus a user-field allow-list, no response support.
pub fn parse_request_with_user_fields(
    request: RawRequest,
    user_fields: Vec<String>,
) -> Result<Snapshot, SnapshotError> {
    parse_request(Config {
        request: Some(request),
        user_fields,
        ..Config::default()
    })
}

/// Unified read-only view over the two input conventions.
struct RequestView<'a> {
    /// The protocol-level request (headers, version, timing marks).
    node: Option<&'a RawRequest>,
    method: Option<&'a str>,
    original_url: Option<&'a str>,
    ip: Option<&'a str>,
    user: Option<&'a RawUser>,
    body: Option<&'a Value>,
    file: Option<&'a Value>,
    files: Option<&'a Value>,
    explicit_id: Option<&'a str>,
}

impl<'a> RequestView<'a> {
    fn build(config: &'a Config) -> Self {
        if let Some(ctx) = &config.context {
            return Self {
                node: Some(&ctx.req),
                method: ctx.method.as_deref(),
                original_url: ctx.original_url.as_deref().or(ctx.url.as_deref()),
                ip: ctx.ip.as_deref(),
                user: ctx.state.user.as_ref(),
                body: ctx.original_body.as_ref().or(ctx.body.as_ref()),
                file: ctx.file.as_ref().or(ctx.req.file.as_ref()),
                files: ctx.files.as_ref().or(ctx.req.files.as_ref()),
                explicit_id: ctx
                    .id
                    .as_deref()
                    .or(ctx.request_id.as_deref())
                    .or(ctx.req.id.as_deref())
                    .or(ctx.state.request_id.as_deref())
                    .or(ctx.state.id.as_deref()),
            };
        }
        if let Some(req) = &config.request {
            return Self {
                node: Some(req),
                method: req.method.as_deref(),
                original_url: req.original_url.as_deref().or(req.url.as_deref()),
                ip: req.ip.as_deref(),
                user: req.user.as_ref(),
                body: req.original_body.as_ref().or(req.body.as_ref()),
                file: req.file.as_ref(),
                files: req.files.as_ref(),
                explicit_id: req.id.as_deref(),
            };
        }
        Self {
            node: None,
            method: None,
            original_url: None,
            ip: None,
            user: None,
            body: None,
            file: None,
            files: None,
            explicit_id: None,
        }
    }
}

/// Split a request target into `origin + path` and the raw query string.
/// Targets without a host (the common server-side case) are split manually.
fn split_url(original: &str) -> (String, String) {
    if let Ok(parsed) = Url::parse(original) {
        if parsed.has_host() {
            let base = format!("{}{}", parsed.origin().ascii_serialization(), parsed.path());
            return (base, parsed.query().unwrap_or("").to_string());
        }
    }
    match original.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (original.to_string(), String::new()),
    }
}

fn parse_query_pairs(raw_query: &str) -> Vec<(String, String)> {
    if raw_query.is_empty() {
        return Vec::new();
    }
    form_urlencoded::parse(raw_query.as_bytes())
        .into_owned()
        .collect()
}

/// Reserialize parsed pairs deterministically, with a leading `?` when
/// non-empty.
fn serialize_query(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    format!("?{}", serializer.finish())
}

/// Build the query mapping; repeated names collect into an array in
/// first-seen order.
fn pairs_to_value(pairs: Vec<(String, String)>) -> Value {
    let mut map: BTreeMap<String, Value> = BTreeMap::new();
    for (name, value) in pairs {
        let value = Value::String(value);
        match map.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(existing) => existing.push(value),
                other => {
                    let first = other.clone();
                    *other = Value::Array(vec![first, value]);
                }
            },
        }
    }
    Value::Object(map)
}

/// Resolve the user record: capability chain, connection IP attach,
/// allow-list projection, then body-mode redaction.
fn resolve_user(user: Option<&RawUser>, ip: Option<&str>, config: &Config) -> Value {
    let mut record = match user {
        Some(raw) => raw.resolve(),
        None => Value::empty_object(),
    };

    if let Value::Object(map) = &mut record {
        if let Some(ip) = ip {
            let has_ip = matches!(map.get("ip_address"), Some(Value::String(_)));
            if !has_ip {
                map.insert("ip_address".to_string(), Value::from(ip));
            }
        }
        if !config.user_fields.is_empty() {
            map.retain(|key, _| config.user_fields.iter().any(|field| field == key));
        }
    }

    mask_props(&record, &config.sanitize_fields, &config.mask_options())
}

/// Normalize uploaded-file metadata: neutralize embedded payloads, then
/// serialize. Only object-like inputs are considered file metadata.
fn resolve_files(view: &RequestView<'_>, config: &Config) -> (Option<String>, Option<String>) {
    if !config.parse_files {
        return (None, None);
    }
    let special_options = config.special_type_options();
    let normalize = |value: Option<&Value>| {
        value
            .filter(|v| v.is_object_like())
            .map(|v| safe_stringify(&mask_special_types(v, &special_options)))
    };
    (normalize(view.file), normalize(view.files))
}

/// Prefer an explicit version string; else compose `major.minor`, accepting
/// numeric or textual parts.
fn resolve_http_version(node: &RawRequest) -> Option<String> {
    if let Some(version) = &node.http_version {
        return Some(version.clone());
    }
    match (&node.http_version_major, &node.http_version_minor) {
        (Some(major), Some(minor)) => Some(format!("{major}.{minor}")),
        _ => None,
    }
}

/// Read the receive time from the recognized timing marks, in fixed
/// fallback order.
fn resolve_received_timestamp(node: &RawRequest) -> Option<String> {
    if let Some(rendered) = node.received_at.and_then(|marker| marker.to_iso_8601()) {
        return Some(rendered);
    }
    if let Some(rendered) = node
        .logger_started_at
        .and_then(crate::utils::iso_from_epoch_millis)
    {
        return Some(rendered);
    }
    node.started_at.and_then(|marker| marker.to_iso_8601())
}

/// Build the response section, when response input yields any headers after
/// masking. Timestamp and duration derivations are best-effort.
fn resolve_response(
    input: Option<&RawResponse>,
    sanitize_headers: &[String],
) -> Option<ResponseSnapshot> {
    let head = match input? {
        RawResponse::Headers(map) => {
            if map.is_empty() {
                return None;
            }
            ResponseHead {
                headers: map.clone(),
                ..ResponseHead::default()
            }
        }
        RawResponse::Raw(text) => {
            if text.trim().is_empty() {
                return None;
            }
            parse_response_head(text)
        }
    };

    let headers = mask_header_map(&lower_case_headers(&head.headers), sanitize_headers);
    if headers.is_empty() {
        return None;
    }

    let timestamp = headers.get("date").and_then(|value| parse_http_date(value));
    let duration = headers
        .get("x-response-time")
        .and_then(|value| parse_duration_millis(value));

    Some(ResponseSnapshot {
        headers,
        http_version: head.version.map(|(major, minor)| format!("{major}.{minor}")),
        status_code: head.status_code,
        reason_phrase: head.reason_phrase,
        timestamp,
        duration,
    })
}

/// ISO-8601 creation time embedded in a v7 id.
fn id_timestamp(id: &Uuid) -> String {
    id.get_timestamp()
        .and_then(|ts| {
            let (secs, nanos) = ts.to_unix();
            DateTime::from_timestamp(secs as i64, nanos)
        })
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
