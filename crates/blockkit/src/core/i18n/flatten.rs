//! Key-path flattening for nested JSON objects.
//!
//! `{"a": {"b": {"c": "x"}}}` flattens to `{"a.b.c": "x"}`. Arrays and
//! primitives are leaves; empty objects are kept as leaves so they survive a
//! round trip.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator between path segments
pub const KEY_SEPARATOR: char = '.';

/// Flattens a nested object into dotted key paths
pub fn flatten(object: &Map<String, Value>) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    flatten_into(object, None, &mut out);
    out
}

fn flatten_into(
    object: &Map<String, Value>,
    prefix: Option<&str>,
    out: &mut BTreeMap<String, Value>,
) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, KEY_SEPARATOR, key),
            None => key.clone(),
        };
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, Some(&path), out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Rebuilds a nested object from dotted key paths.
///
/// When a path runs through a key that holds a leaf (`"a"` and `"a.b"` both
/// present) the leaf is replaced by an object.
pub fn unflatten(flat: &BTreeMap<String, Value>) -> Map<String, Value> {
    let mut root = Map::new();
    for (path, value) in flat {
        insert_path(&mut root, path, value.clone());
    }
    root
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split(KEY_SEPARATOR).peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot.as_object_mut() {
            Some(map) => map,
            None => return,
        };
    }
}
