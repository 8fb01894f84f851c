//! Request-like input structures
//!
//! A framework adapter translates its native request type into these plain
//! carriers before calling the normalizer. Two historical conventions exist:
//! a bare [`RawRequest`] (the request object IS the protocol request), and a
//! wrapped [`RequestContext`] (a framework context that owns the
//! protocol-level request plus per-request state). The normalizer accepts
//! exactly one of the two.
//!
//! Ambient per-request signals (body/query/file parsing opt-outs, timing
//! marks) are explicit fields here or on [`crate::Config`]; the adapter is
//! responsible for translating whatever implicit convention its framework
//! uses into them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use tracing::debug;

use crate::utils::{iso_8601, iso_from_epoch_millis};
use crate::value::Value;

/// A wall-clock mark stamped on the request by timing instrumentation,
/// either as a parsed date or as raw epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeMarker {
    Date(DateTime<Utc>),
    EpochMillis(i64),
}

impl TimeMarker {
    /// Render as ISO-8601; out-of-range epoch values are dropped.
    pub fn to_iso_8601(&self) -> Option<String> {
        match self {
            TimeMarker::Date(dt) => Some(iso_8601(dt)),
            TimeMarker::EpochMillis(ms) => iso_from_epoch_millis(*ms),
        }
    }
}

/// One component of a protocol version, as adapters see it: some frameworks
/// expose numeric major/minor fields, others strings.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionPart {
    Number(u32),
    Text(String),
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPart::Number(n) => write!(f, "{n}"),
            VersionPart::Text(s) => f.write_str(s),
        }
    }
}

/// Fallible conversion a user model exposes to produce its record form.
pub type UserSerializer =
    Arc<dyn Fn() -> Result<Value, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// A user-like object attached to the request.
///
/// `value` is the captured tree form. When the upstream model exposes its own
/// record conversion (an ORM `to_json`-style method), the adapter wraps it in
/// `serializer`; the normalizer prefers it and falls back on failure.
#[derive(Clone, Default)]
pub struct RawUser {
    pub value: Value,
    pub serializer: Option<UserSerializer>,
}

impl RawUser {
    /// A plain captured record with no serializer.
    pub fn record(value: Value) -> Self {
        Self {
            value,
            serializer: None,
        }
    }

    /// A model object with its own (fallible) record conversion.
    pub fn with_serializer<F>(value: Value, serializer: F) -> Self
    where
        F: Fn() -> Result<Value, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            value,
            serializer: Some(Arc::new(serializer)),
        }
    }

    /// Resolve the record form through the capability chain: serializer
    /// method, then the captured tree (a deep clone), then a best-effort
    /// JSON round-trip, then an empty record. Failures never propagate.
    pub(crate) fn resolve(&self) -> Value {
        let Some(serializer) = &self.serializer else {
            return self.value.clone();
        };
        match serializer() {
            Ok(record) => record,
            Err(err) => {
                debug!(error = %err, "user serializer failed, falling back to JSON round-trip");
                match serde_json::to_value(&self.value) {
                    Ok(json) => Value::from(json),
                    Err(err) => {
                        debug!(error = %err, "user JSON round-trip failed");
                        Value::empty_object()
                    }
                }
            }
        }
    }
}

impl fmt::Debug for RawUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawUser")
            .field("value", &self.value)
            .field("serializer", &self.serializer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl From<Value> for RawUser {
    fn from(value: Value) -> Self {
        Self::record(value)
    }
}

impl From<Json> for RawUser {
    fn from(value: Json) -> Self {
        Self::record(Value::from(value))
    }
}

/// The protocol-level request as produced by a framework adapter.
///
/// Every field is optional; absent input yields absent output fields in the
/// snapshot. `original_body` carries the pre-parse payload when body-parsing
/// middleware has already consumed the raw body, and is preferred over
/// `body`.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: Option<String>,
    /// Full request target as first seen (path + query), preferred over `url`.
    pub original_url: Option<String>,
    pub url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<Value>,
    pub original_body: Option<Value>,
    pub user: Option<RawUser>,
    pub ip: Option<String>,
    /// Request correlation id assigned by upstream middleware.
    pub id: Option<String>,
    pub http_version: Option<String>,
    pub http_version_major: Option<VersionPart>,
    pub http_version_minor: Option<VersionPart>,
    /// Single uploaded-file metadata.
    pub file: Option<Value>,
    /// Multiple uploaded files (array or field-name mapping).
    pub files: Option<Value>,
    /// Receive mark stamped by timing instrumentation (preferred).
    pub received_at: Option<TimeMarker>,
    /// Epoch-milliseconds mark stamped by logging integrations.
    pub logger_started_at: Option<i64>,
    /// Legacy start-time mark, last resort.
    pub started_at: Option<TimeMarker>,
}

/// Per-request framework state carried on a wrapped context.
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    pub user: Option<RawUser>,
    pub request_id: Option<String>,
    pub id: Option<String>,
}

/// A wrapped framework context: owns the protocol-level request plus
/// framework-resolved fields that shadow it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The underlying protocol request (headers, version, timing marks).
    pub req: RawRequest,
    pub method: Option<String>,
    pub original_url: Option<String>,
    pub url: Option<String>,
    pub ip: Option<String>,
    pub id: Option<String>,
    /// Id carried on the context's request wrapper.
    pub request_id: Option<String>,
    pub body: Option<Value>,
    pub original_body: Option<Value>,
    pub file: Option<Value>,
    pub files: Option<Value>,
    pub state: ContextState,
}

/// Response input: either structured headers or the raw head text
/// (status line plus headers) as read off the wire.
#[derive(Debug, Clone)]
pub enum RawResponse {
    Headers(HashMap<String, String>),
    Raw(String),
}
