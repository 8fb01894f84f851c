//! Convenience re-exports for easy importing
//!
//! Import everything you need with:
//! ```rust
//! use request_snapshot::prelude::*;
//! ```

pub use crate::config::Config;
pub use crate::error::SnapshotError;
pub use crate::normalize::parse_request;
pub use crate::request::{RawRequest, RawResponse, RawUser, RequestContext};
pub use crate::snapshot::Snapshot;
pub use crate::value::Value;
