//! Type definitions for nested maps.

use serde_json::Number;

use crate::map::NestedMap;

/// A single key segment of a bracket path.
pub type PathStep = String;

/// An ordered sequence of key segments.
pub type Path = Vec<PathStep>;

/// A value stored under a key of a [`NestedMap`].
///
/// JSON objects never appear as raw mappings here: they are always held as
/// [`Value::Map`]. Plain arrays keep their elements as ordinary
/// [`serde_json::Value`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A plain sequence; elements are not traversable by path.
    Array(Vec<serde_json::Value>),
    /// A nested container.
    Map(NestedMap),
    /// A sequence of nested containers, indexable by path (`[U][0][A]`).
    Maps(Vec<NestedMap>),
}

impl Value {
    /// Whether this is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is one.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The number as `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// The number as `f64`, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    /// The elements of a plain array.
    pub fn as_array(&self) -> Option<&Vec<serde_json::Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The nested container, if this is one.
    pub fn as_map(&self) -> Option<&NestedMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable counterpart of [`as_map`](Self::as_map).
    pub fn as_map_mut(&mut self) -> Option<&mut NestedMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The containers of a sequence built by decoding with
    /// [`DecodeOptions::wrap_object_arrays`](crate::DecodeOptions::wrap_object_arrays)
    /// or by setting a `Vec<NestedMap>`.
    pub fn as_maps(&self) -> Option<&[NestedMap]> {
        match self {
            Value::Maps(maps) => Some(maps),
            _ => None,
        }
    }

    /// Name of the JSON kind this value encodes as.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Maps(_) => "array",
            Value::Map(_) => "object",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        // NaN and infinities have no JSON form.
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::from(f as f64)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<NestedMap> for Value {
    fn from(map: NestedMap) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<NestedMap>> for Value {
    fn from(maps: Vec<NestedMap>) -> Self {
        Value::Maps(maps)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Objects are wrapped into [`NestedMap`]s with the default fix-up.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        crate::codec::fix_up(value, &crate::codec::DecodeOptions::default())
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        crate::codec::unwrap(self) == *other
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", crate::codec::unwrap(other)),
        }
    }
}
