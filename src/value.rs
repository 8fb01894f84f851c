//! Value trees and runtime type classification
//!
//! Framework adapters hand the normalizer plain data: a request body, a user
//! record, uploaded-file metadata. [`Value`] is the tree union those adapters
//! produce. On top of the usual JSON shapes it carries the three runtime
//! types that must never reach a log line as-is (byte buffers, raw memory
//! blocks, stream handles) plus canonical object identifiers.
//!
//! [`classify`] is the single decision point that maps a node to a [`Kind`].
//! Every masking pass branches on `Kind` instead of probing value shapes at
//! its own call sites.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

use crate::config::SpecialTypeOptions;

/// A 12-byte canonical object identifier with a 24-hex-char string form.
///
/// Database layers commonly hand these to the adapter as opaque id objects.
/// They must be recognized before generic object traversal so they are
/// rendered as their hex form rather than shredded into internal bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parse the canonical 24-hex-char form.
    pub fn parse_str(hex: &str) -> Option<Self> {
        if !Self::is_valid_hex(hex) {
            return None;
        }
        let mut bytes = [0u8; 12];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let digit = |b: u8| (b as char).to_digit(16).map(|d| d as u8);
            bytes[i] = digit(chunk[0])? << 4 | digit(chunk[1])?;
        }
        Some(Self(bytes))
    }

    /// Whether `value` is a canonical 24-hex-char identifier string.
    pub fn is_valid_hex(value: &str) -> bool {
        value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(24);
        for byte in &self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The tree union handed in by framework adapters.
///
/// Masking passes never mutate a `Value` in place: they rebuild, so the
/// caller's original request data stays intact for downstream handlers.
/// Cycles are unrepresentable (children are owned), which is what makes
/// [`safe_stringify`] safe without any cycle bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A contiguous byte buffer (e.g. a captured request payload chunk).
    Buffer(Bytes),
    /// A raw fixed-length memory block.
    ArrayBuffer(Vec<u8>),
    /// An opaque handle standing in for a live readable stream. The adapter
    /// substitutes this marker for any reader it cannot capture as data.
    Stream,
    /// A canonical object identifier (see [`ObjectId`]).
    Id(ObjectId),
}

impl Value {
    /// Empty mapping, the default for absent user records.
    pub fn empty_object() -> Self {
        Value::Object(BTreeMap::new())
    }

    /// Whether this node is object-like (anything that is not a plain
    /// primitive). File metadata is only normalized for object-like values.
    pub fn is_object_like(&self) -> bool {
        !matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    /// Convert to plain JSON. Special leaves take their serialized forms
    /// (see the `Serialize` impl).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
            // An unmasked buffer serializes with its raw bytes attached;
            // enabling `mask_buffers` replaces it with a descriptor instead.
            Value::Buffer(bytes) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "Buffer")?;
                let data: &[u8] = bytes.as_ref();
                map.serialize_entry("data", data)?;
                map.end()
            }
            // Raw memory and stream handles have no serializable content.
            Value::ArrayBuffer(_) | Value::Stream => {
                serializer.serialize_map(Some(0))?.end()
            }
            Value::Id(id) => serializer.serialize_str(&id.to_hex()),
        }
    }
}

/// Category assigned to a node by [`classify`]. Each masking pass is an
/// exhaustive case over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Primitive,
    Array,
    IdentifierObject,
    Stream,
    Buffer,
    ArrayBuffer,
    PlainObject,
}

/// Classify a node. Priority order matters: identifier objects are checked
/// before generic object handling so they are not shredded into their
/// internal byte fields, and disabled special types fall through to
/// plain-object treatment.
pub fn classify(value: &Value, options: &SpecialTypeOptions) -> Kind {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Kind::Primitive,
        Value::Array(_) => Kind::Array,
        Value::Id(_) if options.check_object_id => Kind::IdentifierObject,
        Value::Stream if options.mask_streams => Kind::Stream,
        Value::Buffer(_) if options.mask_buffers => Kind::Buffer,
        Value::ArrayBuffer(_) if options.mask_buffers => Kind::ArrayBuffer,
        _ => Kind::PlainObject,
    }
}

/// Serialize a tree to a JSON string without ever panicking or looping.
///
/// Cycles cannot exist in an owned `Value` tree, so this is a total
/// function; a serializer error is degraded to an empty string.
pub fn safe_stringify(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            debug!(error = %err, "failed to stringify value tree");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_id_round_trip() {
        let id = ObjectId::parse_str("542f9cabed89afee4aaf2e61").unwrap();
        assert_eq!(id.to_hex(), "542f9cabed89afee4aaf2e61");
        assert_eq!(id.to_string(), "542f9cabed89afee4aaf2e61");
    }

    #[test]
    fn test_object_id_rejects_bad_hex() {
        assert!(ObjectId::parse_str("not-an-id").is_none());
        // right length, bad alphabet
        assert!(ObjectId::parse_str("542f9cabed89afee4aaf2ezz").is_none());
        // wrong length
        assert!(ObjectId::parse_str("542f9cab").is_none());
        assert!(ObjectId::is_valid_hex("542F9CABED89AFEE4AAF2E61"));
    }

    #[test]
    fn test_from_json_round_trip() {
        let tree = Value::from(json!({
            "name": "nifty",
            "count": 3,
            "flags": [true, false, null]
        }));
        assert_eq!(tree.to_json(), json!({
            "name": "nifty",
            "count": 3,
            "flags": [true, false, null]
        }));
    }

    #[test]
    fn test_classify_priority_order() {
        let options = SpecialTypeOptions::default();
        assert_eq!(classify(&Value::Null, &options), Kind::Primitive);
        assert_eq!(classify(&Value::from("x"), &options), Kind::Primitive);
        assert_eq!(classify(&Value::Array(vec![]), &options), Kind::Array);
        assert_eq!(classify(&Value::Stream, &options), Kind::Stream);
        assert_eq!(
            classify(&Value::Buffer(Bytes::from_static(b"abc")), &options),
            Kind::Buffer
        );
        assert_eq!(
            classify(&Value::ArrayBuffer(vec![0; 4]), &options),
            Kind::ArrayBuffer
        );
        assert_eq!(classify(&Value::empty_object(), &options), Kind::PlainObject);
        let id = ObjectId::parse_str("542f9cabed89afee4aaf2e61").unwrap();
        assert_eq!(classify(&Value::Id(id), &options), Kind::IdentifierObject);
    }

    #[test]
    fn test_classify_disabled_special_types_fall_through() {
        let options = SpecialTypeOptions {
            mask_buffers: false,
            mask_streams: false,
            check_object_id: false,
        };
        assert_eq!(classify(&Value::Stream, &options), Kind::PlainObject);
        assert_eq!(
            classify(&Value::Buffer(Bytes::from_static(b"abc")), &options),
            Kind::PlainObject
        );
        let id = ObjectId::parse_str("542f9cabed89afee4aaf2e61").unwrap();
        assert_eq!(classify(&Value::Id(id), &options), Kind::PlainObject);
    }

    #[test]
    fn test_serialize_special_leaves() {
        let mut map = BTreeMap::new();
        map.insert("buf".to_string(), Value::Buffer(Bytes::from_static(b"hi")));
        map.insert("stream".to_string(), Value::Stream);
        map.insert(
            "id".to_string(),
            Value::Id(ObjectId::parse_str("542f9cabed89afee4aaf2e61").unwrap()),
        );
        let json = safe_stringify(&Value::Object(map));
        assert_eq!(
            json,
            r#"{"buf":{"type":"Buffer","data":[104,105]},"id":"542f9cabed89afee4aaf2e61","stream":{}}"#
        );
    }

    #[test]
    fn test_safe_stringify_scalars() {
        assert_eq!(safe_stringify(&Value::from(json!(1))), "1");
        assert_eq!(safe_stringify(&Value::from("hey")), "\"hey\"");
        assert_eq!(safe_stringify(&Value::Null), "null");
    }
}
