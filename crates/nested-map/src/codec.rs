//! JSON encoding and decoding.
//!
//! Decoding runs a fix-up pass that wraps every JSON object into a
//! [`NestedMap`]. Encoding runs the reverse unwrap pass, so the serialized
//! form is exactly what a plain `serde_json::Value` tree would produce.
//!
//! Both passes grow the stack on demand, so depth is bounded only by
//! [`DecodeOptions::max_depth`] and never by `serde_json`'s built-in
//! recursion limit of 128.

use std::str::FromStr;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::map::NestedMap;
use crate::types::Value;

/// Nesting accepted by default, counting the root object as level 1.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Stack left free before a recursive step switches to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated on demand.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Failure to turn JSON into a [`NestedMap`] or back.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input is not well-formed JSON.
    #[error("failed to decode nested map: {0}")]
    Decode(#[source] serde_json::Error),
    /// The input is JSON, but its root is not an object.
    #[error("nested map root must be an object, found {0}")]
    NotAnObject(&'static str),
    /// Objects and arrays nest deeper than [`DecodeOptions::max_depth`].
    #[error("nested map is deeper than the limit of {0} levels")]
    TooDeep(usize),
    /// The JSON encoder rejected a value.
    #[error("failed to encode nested map: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Options for the decode-time fix-up pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Turn non-empty arrays whose elements are all objects into
    /// [`Value::Maps`], so they can be indexed by path. Off by default:
    /// arrays are then kept as plain JSON and objects inside them stay
    /// unwrapped.
    pub wrap_object_arrays: bool,
    /// Deepest nesting of objects and arrays accepted, the root object being
    /// level 1. Defaults to [`DEFAULT_MAX_DEPTH`].
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            wrap_object_arrays: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Set [`wrap_object_arrays`](Self::wrap_object_arrays).
    pub fn wrap_object_arrays(mut self, enabled: bool) -> Self {
        self.wrap_object_arrays = enabled;
        self
    }

    /// Set [`max_depth`](Self::max_depth).
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parse JSON text with the recursion limit off; `serde_stacker` moves the
/// parser onto heap-allocated stack segments as it descends.
fn parse_json<'de, R: serde_json::de::Read<'de>>(
    mut de: serde_json::Deserializer<R>,
) -> Result<JsonValue, CodecError> {
    de.disable_recursion_limit();
    let value = JsonValue::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(CodecError::Decode)?;
    de.end().map_err(CodecError::Decode)?;
    Ok(value)
}

/// Deepest object/array nesting under a root object (level 1), or `None`
/// once it passes `max_depth`.
fn object_depth(obj: &Map<String, JsonValue>, max_depth: usize) -> Option<usize> {
    if max_depth == 0 {
        return None;
    }
    let mut deepest = 1;
    let mut pending: Vec<(&JsonValue, usize)> = obj.values().map(|child| (child, 2)).collect();
    while let Some((node, depth)) = pending.pop() {
        if !matches!(node, JsonValue::Object(_) | JsonValue::Array(_)) {
            continue;
        }
        if depth > max_depth {
            return None;
        }
        deepest = deepest.max(depth);
        match node {
            JsonValue::Object(obj) => pending.extend(obj.values().map(|child| (child, depth + 1))),
            JsonValue::Array(items) => pending.extend(items.iter().map(|child| (child, depth + 1))),
            _ => {}
        }
    }
    Some(deepest)
}

/// Release a JSON tree of any depth without recursing.
fn discard(value: JsonValue) {
    let mut pending = vec![value];
    while let Some(node) = pending.pop() {
        match node {
            JsonValue::Object(obj) => pending.extend(obj.into_iter().map(|(_, v)| v)),
            JsonValue::Array(items) => pending.extend(items),
            _ => {}
        }
    }
}

/// Root and depth checks shared by every decode entry point, then fix-up.
fn hydrate(value: JsonValue, options: &DecodeOptions) -> Result<NestedMap, CodecError> {
    let obj = match value {
        JsonValue::Object(obj) => obj,
        other => return Err(CodecError::NotAnObject(json_kind(&other))),
    };
    let Some(depth) = object_depth(&obj, options.max_depth) else {
        tracing::debug!(max_depth = options.max_depth, "rejecting document nested too deeply");
        discard(JsonValue::Object(obj));
        return Err(CodecError::TooDeep(options.max_depth));
    };
    tracing::trace!(depth, "decoding nested map");
    Ok(fix_up_object(obj, options))
}

/// Wrap JSON objects into containers, bottom-up.
pub(crate) fn fix_up(value: JsonValue, options: &DecodeOptions) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => Value::Number(n),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Object(obj) => Value::Map(fix_up_object(obj, options)),
        JsonValue::Array(items) => {
            let wrap = options.wrap_object_arrays
                && !items.is_empty()
                && items.iter().all(JsonValue::is_object);
            if !wrap {
                return Value::Array(items);
            }
            tracing::trace!(len = items.len(), "wrapping object array into container sequence");
            Value::Maps(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        JsonValue::Object(obj) => Some(fix_up_object(obj, options)),
                        _ => None,
                    })
                    .collect(),
            )
        }
    }
}

fn fix_up_object(obj: Map<String, JsonValue>, options: &DecodeOptions) -> NestedMap {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
        obj.into_iter()
            .map(|(key, value)| (key, fix_up(value, options)))
            .collect()
    })
}

/// Strip container wrappers back to plain JSON.
pub(crate) fn unwrap(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => JsonValue::Number(n.clone()),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) => JsonValue::Array(items.clone()),
        Value::Map(map) => JsonValue::Object(unwrap_map(map)),
        Value::Maps(maps) => JsonValue::Array(
            maps.iter()
                .map(|map| JsonValue::Object(unwrap_map(map)))
                .collect(),
        ),
    }
}

fn unwrap_map(map: &NestedMap) -> Map<String, JsonValue> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
        map.iter()
            .map(|(key, value)| (key.clone(), unwrap(value)))
            .collect()
    })
}

fn into_unwrapped(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Number(n) => JsonValue::Number(n),
        Value::String(s) => JsonValue::String(s),
        Value::Array(items) => JsonValue::Array(items),
        Value::Map(map) => map.into_json_value(),
        Value::Maps(maps) => {
            JsonValue::Array(maps.into_iter().map(NestedMap::into_json_value).collect())
        }
    }
}

impl NestedMap {
    /// Build a container from a decoded JSON value, wrapping nested objects.
    ///
    /// # Errors
    ///
    /// [`CodecError::NotAnObject`] if the root is not a JSON object, and
    /// [`CodecError::TooDeep`] past [`DEFAULT_MAX_DEPTH`] levels.
    pub fn from_json_value(value: JsonValue) -> Result<Self, CodecError> {
        Self::from_json_value_with(value, &DecodeOptions::default())
    }

    /// Like [`from_json_value`](Self::from_json_value), with explicit options.
    pub fn from_json_value_with(
        value: JsonValue,
        options: &DecodeOptions,
    ) -> Result<Self, CodecError> {
        hydrate(value, options)
    }

    /// Decode a JSON document whose root is an object.
    ///
    /// # Example
    ///
    /// ```
    /// use nested_map::NestedMap;
    ///
    /// let map = NestedMap::from_json_str(r#"{"A": {"B": 1}}"#).unwrap();
    /// assert_eq!(map.get("[A][B]").and_then(|v| v.as_i64()), Some(1));
    /// assert!(NestedMap::from_json_str("[1, 2]").is_err());
    /// assert!(NestedMap::from_json_str("{").is_err());
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, CodecError> {
        Self::from_json_str_with(json, &DecodeOptions::default())
    }

    /// Like [`from_json_str`](Self::from_json_str), with explicit options.
    pub fn from_json_str_with(json: &str, options: &DecodeOptions) -> Result<Self, CodecError> {
        hydrate(parse_json(serde_json::Deserializer::from_str(json))?, options)
    }

    /// Decode a JSON document from UTF-8 bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_json_slice_with(bytes, &DecodeOptions::default())
    }

    /// Like [`from_json_slice`](Self::from_json_slice), with explicit options.
    pub fn from_json_slice_with(bytes: &[u8], options: &DecodeOptions) -> Result<Self, CodecError> {
        hydrate(parse_json(serde_json::Deserializer::from_slice(bytes))?, options)
    }

    /// Convert to a plain JSON object tree.
    pub fn to_json_value(&self) -> JsonValue {
        JsonValue::Object(unwrap_map(self))
    }

    /// Convert to a plain JSON object tree, consuming the container.
    pub fn into_json_value(self) -> JsonValue {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            JsonValue::Object(
                self.into_iter()
                    .map(|(key, value)| (key, into_unwrapped(value)))
                    .collect(),
            )
        })
    }

    /// Encode as compact JSON.
    pub fn to_json_string(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    /// Encode as indented JSON.
    pub fn to_json_string_pretty(&self) -> Result<String, CodecError> {
        serde_json::to_string_pretty(self).map_err(CodecError::Encode)
    }

    /// Encode as compact JSON bytes.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl FromStr for NestedMap {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl TryFrom<JsonValue> for NestedMap {
    type Error = CodecError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl From<NestedMap> for JsonValue {
    fn from(map: NestedMap) -> Self {
        map.into_json_value()
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        into_unwrapped(value)
    }
}

impl Serialize for NestedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            serializer.collect_map(self.iter())
        })
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Map(map) => map.serialize(serializer),
            Value::Maps(maps) => serializer.collect_seq(maps),
        }
    }
}

/// Decodes a JSON object and applies the default fix-up.
///
/// The caller's deserializer keeps its own limits: `serde_json::from_str`
/// stops at 128 levels. Use [`NestedMap::from_json_str`] for deeper input.
impl<'de> Deserialize<'de> for NestedMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let obj = Map::<String, JsonValue>::deserialize(serde_stacker::Deserializer::new(
            deserializer,
        ))?;
        hydrate(JsonValue::Object(obj), &DecodeOptions::default()).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(serde_stacker::Deserializer::new(deserializer)).map(Value::from)
    }
}

impl std::fmt::Display for NestedMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
