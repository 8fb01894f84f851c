//! Snapshot output structures
//!
//! The final normalized record produced by one call. Snapshots are plain
//! data, serialized to JSON by downstream logging and error-reporting
//! pipelines; absent inputs serialize as absent fields, never as `null`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Value;

/// Complete normalized snapshot of one request (and optionally its
/// response).
#[derive(Serialize, Debug, Clone)]
pub struct Snapshot {
    /// Time-ordered unique id for this snapshot.
    pub id: String,

    /// ISO-8601 creation time embedded in `id`.
    pub timestamp: String,

    /// Normalized request, present when request input was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSnapshot>,

    /// Redacted user record; empty when no user input was available.
    pub user: Value,

    /// Normalized response, present when response input produced any
    /// headers after masking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,

    /// Wall-clock milliseconds spent building this snapshot.
    pub duration: f64,
}

/// Normalized request portion of a snapshot.
#[derive(Serialize, Debug, Clone)]
pub struct RequestSnapshot {
    /// HTTP method, defaulted to `GET` when the input carried none.
    pub method: String,

    /// Absolute URL rebuilt from path plus deterministically reserialized
    /// query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Lower-cased, redacted headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// Cookies parsed from the (already redacted) `cookie` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<BTreeMap<String, String>>,

    /// Redacted query mapping, or the raw query string when query parsing
    /// is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,

    /// Redacted body, serialized to a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Normalized single-file upload metadata, serialized to a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Normalized multi-file upload metadata, serialized to a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Request correlation id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Protocol version, e.g. `1.1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_version: Option<String>,

    /// ISO-8601 receive time from the request's timing marks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Normalized response portion of a snapshot.
#[derive(Serialize, Debug, Clone)]
pub struct ResponseSnapshot {
    /// Lower-cased, redacted headers.
    pub headers: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_phrase: Option<String>,

    /// ISO-8601 time parsed from the `date` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Milliseconds parsed from the `x-response-time` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}
