//! Error types for request-snapshot
//!
//! Almost every failure mode in this crate is recoverable by design: parse
//! failures on dates, durations, and response head text are logged at debug
//! level and the affected field is omitted from the snapshot. The one
//! exception is a configuration mistake by the integrating adapter, which is
//! surfaced as a hard error instead of a degraded snapshot.

use thiserror::Error;

/// Main error type for snapshot construction
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Both a bare request and a wrapped context were supplied in one call
    #[error("config must supply either `request` or `context`, but not both")]
    AmbiguousContext,
}
