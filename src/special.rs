//! Special-type masking
//!
//! Rewrites a value tree so that nothing unserializable or payload-bearing
//! survives: byte buffers and raw memory blocks become small descriptor
//! records carrying only their byte length, stream handles become a typed
//! marker, and identifier objects collapse to their canonical hex string.
//! Everything else is rebuilt structurally, so the input is never mutated.

use std::collections::BTreeMap;

use crate::config::SpecialTypeOptions;
use crate::value::{classify, Kind, Value};

/// Rewrite a tree, replacing special-typed nodes with descriptors.
///
/// Arrays are rebuilt element-wise in order, plain objects key-by-key. With
/// `mask_buffers`/`mask_streams` enabled, the output contains no binary
/// payloads or stream handles reachable from the root; with a flag disabled,
/// the corresponding nodes are carried through unchanged. Recursion strictly
/// descends into children, and cycles are unrepresentable in [`Value`], so
/// the pass always terminates.
pub fn mask_special_types(value: &Value, options: &SpecialTypeOptions) -> Value {
    match (classify(value, options), value) {
        (Kind::Array, Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| mask_special_types(item, options))
                .collect(),
        ),
        (Kind::IdentifierObject, Value::Id(id)) => Value::String(id.to_hex()),
        (Kind::Stream, _) => stream_descriptor(),
        (Kind::Buffer, Value::Buffer(bytes)) => byte_descriptor("Buffer", bytes.len()),
        (Kind::ArrayBuffer, Value::ArrayBuffer(bytes)) => {
            byte_descriptor("ArrayBuffer", bytes.len())
        }
        (Kind::PlainObject, Value::Object(map)) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), mask_special_types(child, options)))
                .collect(),
        ),
        // primitives, and special types whose masking flag is disabled
        _ => value.clone(),
    }
}

fn stream_descriptor() -> Value {
    let mut map = BTreeMap::new();
    map.insert("type".to_string(), Value::from("Stream"));
    Value::Object(map)
}

fn byte_descriptor(kind: &str, byte_length: usize) -> Value {
    let mut map = BTreeMap::new();
    map.insert("type".to_string(), Value::from(kind));
    map.insert(
        "byteLength".to_string(),
        Value::Number(serde_json::Number::from(byte_length as u64)),
    );
    Value::Object(map)
}
