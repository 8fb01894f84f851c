//! Configuration for snapshot construction
//!
//! One [`Config`] is read per call. The core treats it as immutable: defaults
//! are baked in by [`Config::default`] and callers override individual fields
//! with struct-update syntax, so a caller's options record is never written
//! back to.
//!
//! ```rust
//! use request_snapshot::{Config, RawRequest};
//!
//! let config = Config {
//!     request: Some(RawRequest {
//!         method: Some("POST".into()),
//!         ..Default::default()
//!     }),
//!     sanitize_headers: vec!["authorization".into(), "x-api-key".into()],
//!     ..Default::default()
//! };
//! assert!(config.mask_credit_cards);
//! ```

use crate::fields;
use crate::request::{RawRequest, RawResponse, RequestContext};

/// Per-call configuration and input carrier.
///
/// Exactly one of `request` / `context` may be set; supplying both aborts the
/// call with [`crate::SnapshotError::AmbiguousContext`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Bare request-like input.
    pub request: Option<RawRequest>,

    /// Wrapped framework context input (owns its protocol-level request).
    pub context: Option<RequestContext>,

    /// Optional response input: structured headers or a raw head text blob.
    pub response: Option<RawResponse>,

    /// Allow-list the user record is projected down to; empty disables
    /// projection.
    pub user_fields: Vec<String>,

    /// Field names redacted in bodies, user records, and query maps
    /// (exact match).
    pub sanitize_fields: Vec<String>,

    /// Header names redacted in request/response headers (case-insensitive).
    pub sanitize_headers: Vec<String>,

    /// Replace digits of credit-card-shaped strings with `*`.
    pub mask_credit_cards: bool,

    /// Replace byte buffers and raw memory blocks with descriptor records.
    pub mask_buffers: bool,

    /// Replace stream handles with descriptor records.
    pub mask_streams: bool,

    /// Exempt `id`-style field names from redaction.
    pub check_id: bool,

    /// Exempt CUID-shaped string values from redaction.
    pub check_cuid: bool,

    /// Recognize canonical object identifiers (values and hex strings).
    pub check_object_id: bool,

    /// Exempt UUID (v1-v5) string values from redaction.
    pub check_uuid: bool,

    /// Normalize the request body. Adapters clear this to honor a per-request
    /// opt-out.
    pub parse_body: bool,

    /// Parse and mask the query string; when cleared the raw query string is
    /// passed through unchanged.
    pub parse_query: bool,

    /// Normalize uploaded-file metadata.
    pub parse_files: bool,
}

impl Config {
    /// Options slice consumed by the sensitive-field masker, body mode.
    pub(crate) fn mask_options(&self) -> MaskOptions {
        MaskOptions {
            mask_credit_cards: self.mask_credit_cards,
            is_headers: false,
            check_id: self.check_id,
            check_cuid: self.check_cuid,
            check_object_id: self.check_object_id,
            check_uuid: self.check_uuid,
        }
    }

    /// Options slice consumed by the special-type masker.
    pub(crate) fn special_type_options(&self) -> SpecialTypeOptions {
        SpecialTypeOptions {
            mask_buffers: self.mask_buffers,
            mask_streams: self.mask_streams,
            check_object_id: self.check_object_id,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request: None,
            context: None,
            response: None,
            user_fields: default_user_fields(),
            sanitize_fields: fields::default_sanitize_fields(),
            sanitize_headers: vec!["authorization".to_string()],
            mask_credit_cards: true,
            mask_buffers: true,
            mask_streams: true,
            check_id: true,
            check_cuid: true,
            check_object_id: true,
            check_uuid: true,
            parse_body: true,
            parse_query: true,
            parse_files: true,
        }
    }
}

fn default_user_fields() -> Vec<String> {
    ["id", "email", "full_name", "ip_address"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Options for the sensitive-field masker.
///
/// `is_headers` switches between the two operating modes: header mode
/// (case-insensitive names, no value heuristics) and body mode (exact names,
/// full exemption precedence).
#[derive(Debug, Clone, Copy)]
pub struct MaskOptions {
    pub mask_credit_cards: bool,
    pub is_headers: bool,
    pub check_id: bool,
    pub check_cuid: bool,
    pub check_object_id: bool,
    pub check_uuid: bool,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            mask_credit_cards: true,
            is_headers: false,
            check_id: true,
            check_cuid: true,
            check_object_id: true,
            check_uuid: true,
        }
    }
}

/// Options for the special-type masker.
#[derive(Debug, Clone, Copy)]
pub struct SpecialTypeOptions {
    pub mask_buffers: bool,
    pub mask_streams: bool,
    pub check_object_id: bool,
}

impl Default for SpecialTypeOptions {
    fn default() -> Self {
        Self {
            mask_buffers: true,
            mask_streams: true,
            check_object_id: true,
        }
    }
}
