//! # request-snapshot
//!
//! Normalize an incoming HTTP request (and optionally a response) into a
//! single, redacted, serialization-safe snapshot suitable for logging or
//! error reporting. This is a pure, synchronous data transformation: one
//! bounded call per request, no retained state, no I/O beyond reading the
//! clock.
//!
//! The crate is built around these principles:
//!
//! - **Non-mutating**: caller-supplied request data is never altered; every
//!   masking pass rebuilds a fresh tree
//! - **Fail-soft**: malformed dates, durations, and response head text never
//!   abort a call; the affected field is simply omitted
//! - **Secure by default**: passwords and card numbers are redacted, binary
//!   payloads and stream handles become small descriptors
//! - **Correlation-friendly**: object ids, CUIDs, and UUIDs stay readable so
//!   operators can still trace requests through their logs
//!
//! ## Quick Start
//!
//! ```rust
//! use request_snapshot::{parse_request, Config, RawRequest, Value};
//! use serde_json::json;
//!
//! let snapshot = parse_request(Config {
//!     request: Some(RawRequest {
//!         method: Some("POST".into()),
//!         original_url: Some("/login?next=%2Fhome".into()),
//!         body: Some(Value::from(json!({
//!             "email": "user@example.com",
//!             "password": "hunter2"
//!         }))),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! })
//! .expect("single request context");
//!
//! let request = snapshot.request.expect("request input was supplied");
//! assert_eq!(
//!     request.body.as_deref(),
//!     Some(r#"{"email":"user@example.com","password":"*******"}"#)
//! );
//! assert_eq!(request.url.as_deref(), Some("/login?next=%2Fhome"));
//! ```
//!
//! ## How It Works
//!
//! 1. A framework adapter captures the request into plain [`RawRequest`] /
//!    [`RequestContext`] carriers (this crate ships no adapters)
//! 2. Headers are lower-cased and redacted per `sanitize_headers`
//! 3. The body and user record pass through the special-type masker (buffers,
//!    streams, object ids) and the sensitive-field masker (field names, card
//!    numbers, identifier exemptions)
//! 4. Timing and correlation metadata are attached and the [`Snapshot`] is
//!    returned for the caller to serialize
//!
//! ## Architecture
//!
//! The crate is structured into focused modules:
//!
//! - `value`: the tree union adapters produce, plus runtime classification
//! - `special`: special-type masking (buffers, streams, identifier objects)
//! - `sanitize`: sensitive-field masking with its exemption precedence
//! - `card`: credit-card number detection
//! - `normalize`: the orchestrator assembling snapshots
//! - `config`: per-call configuration with immutable defaults
//! - `request` / `snapshot`: input carriers and output records
//! - `response`: raw response head parsing
//! - `error`: the single hard error
//! - `utils`: cookies, dates, durations, header normalization

pub mod card;
pub mod config;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod prelude;
pub mod request;
pub mod response;
pub mod sanitize;
pub mod snapshot;
pub mod special;
pub mod utils;
pub mod value;

// Re-export main components for easy access
pub use config::{Config, MaskOptions, SpecialTypeOptions};
pub use error::SnapshotError;
pub use normalize::{parse_request, parse_request_with_user_fields};
pub use request::{
    ContextState, RawRequest, RawResponse, RawUser, RequestContext, TimeMarker, VersionPart,
};
pub use sanitize::{mask_header_map, mask_props};
pub use snapshot::{RequestSnapshot, ResponseSnapshot, Snapshot};
pub use special::mask_special_types;
pub use value::{classify, safe_stringify, Kind, ObjectId, Value};
