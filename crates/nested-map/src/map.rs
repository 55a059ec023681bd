//! The nested container and its path traversal.

use indexmap::IndexMap;
use thiserror::Error;

use crate::path::{format_path, parse_index, parse_path, try_parse_path, PathError};
use crate::types::Value;

/// Why [`NestedMap::try_get`] found nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The path string has no `[key]` segments.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The path parsed, but no value lives there.
    #[error("no value at path {0}")]
    NotFound(String),
}

/// A string-keyed tree node whose object-typed values are themselves
/// `NestedMap`s.
///
/// Every container exclusively owns its children, so a tree is never shared
/// and never cyclic. Mutation goes through `&mut self`; there is no internal
/// locking.
///
/// Keys keep their insertion order, which is also the encoding order.
/// Equality does not depend on key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedMap {
    contents: IndexMap<String, Value>,
}

impl NestedMap {
    /// Create an empty container, ready for [`set`](Self::set).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container with room for `capacity` direct keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            contents: IndexMap::with_capacity(capacity),
        }
    }

    /// Number of direct keys.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the container has no keys.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Direct keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }

    /// Direct entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.contents.iter()
    }

    /// Borrow the direct entries of this container.
    pub fn entries(&self) -> &IndexMap<String, Value> {
        &self.contents
    }

    /// Take the direct entries out of this container.
    pub fn into_entries(mut self) -> IndexMap<String, Value> {
        std::mem::take(&mut self.contents)
    }

    /// Get the value at a bracket path.
    ///
    /// Returns `None` if the path has no bracket segments, a key is missing,
    /// an intermediate value is neither a container nor a sequence of
    /// containers, or a sequence index is malformed or out of range.
    ///
    /// A sequence of containers consumes two segments: its key and the index.
    /// A path ending on the index (`[U][0]`) is therefore `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use nested_map::NestedMap;
    ///
    /// let map: NestedMap = r#"{"A": {"B": {"C": "value"}}}"#.parse().unwrap();
    /// assert_eq!(map.get("[A][B][C]").and_then(|v| v.as_str()), Some("value"));
    /// assert!(map.get("[A][X]").is_none());
    /// assert!(map.get("A.B.C").is_none());
    /// ```
    pub fn get(&self, path: &str) -> Option<&Value> {
        let keys = parse_path(path)?;
        self.get_at(&keys)
    }

    /// Get the value at an already parsed path. An empty path is `None`.
    pub fn get_at(&self, keys: &[String]) -> Option<&Value> {
        let mut map = self;
        let mut steps = keys;
        loop {
            let (key, rest) = steps.split_first()?;
            let value = map.contents.get(key)?;
            if rest.is_empty() {
                return Some(value);
            }
            match value {
                Value::Map(child) => {
                    map = child;
                    steps = rest;
                }
                Value::Maps(children) => {
                    let (index, rest) = rest.split_first()?;
                    tracing::trace!(key = %key, %index, "descending into container sequence");
                    map = children.get(parse_index(index)?)?;
                    steps = rest;
                }
                _ => return None,
            }
        }
    }

    /// Mutable counterpart of [`get`](Self::get), with the same traversal rules.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let keys = parse_path(path)?;
        self.get_at_mut(&keys)
    }

    /// Mutable counterpart of [`get_at`](Self::get_at).
    pub fn get_at_mut(&mut self, keys: &[String]) -> Option<&mut Value> {
        let mut map = self;
        let mut steps = keys;
        loop {
            let (key, rest) = steps.split_first()?;
            let value = map.contents.get_mut(key)?;
            if rest.is_empty() {
                return Some(value);
            }
            match value {
                Value::Map(child) => {
                    map = child;
                    steps = rest;
                }
                Value::Maps(children) => {
                    let (index, rest) = rest.split_first()?;
                    map = children.get_mut(parse_index(index)?)?;
                    steps = rest;
                }
                _ => return None,
            }
        }
    }

    /// Like [`get`](Self::get), but tells an unparseable path apart from a
    /// missing value.
    ///
    /// # Example
    ///
    /// ```
    /// use nested_map::{LookupError, NestedMap, PathError};
    ///
    /// let map = NestedMap::new();
    /// assert_eq!(
    ///     map.try_get("oops"),
    ///     Err(LookupError::Path(PathError::NoSegments("oops".to_string())))
    /// );
    /// assert_eq!(map.try_get("[a]"), Err(LookupError::NotFound("[a]".to_string())));
    /// ```
    pub fn try_get(&self, path: &str) -> Result<&Value, LookupError> {
        let keys = try_parse_path(path)?;
        self.get_at(&keys)
            .ok_or_else(|| LookupError::NotFound(format_path(&keys)))
    }

    /// Check if [`get`](Self::get) would find a value, `null` included.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a value at a bracket path, creating intermediate containers.
    ///
    /// Any intermediate key that does not hold a container (missing, a
    /// scalar, a plain array, or a sequence of containers) is overwritten with
    /// a fresh empty container. The only failure is a path with no bracket
    /// segments, reported as `false`.
    ///
    /// Sequence indexes are not interpreted here: `[U][0][A]` over a sequence
    /// at `U` replaces that sequence with a container holding key `"0"`.
    ///
    /// # Example
    ///
    /// ```
    /// use nested_map::NestedMap;
    ///
    /// let mut map = NestedMap::new();
    /// assert!(map.set("[A][B][C]", "value"));
    /// assert_eq!(map.to_json_string().unwrap(), r#"{"A":{"B":{"C":"value"}}}"#);
    /// assert!(!map.set("no brackets", 1));
    /// ```
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> bool {
        self.try_set(path, value).is_ok()
    }

    /// Like [`set`](Self::set), returning the value previously stored at the
    /// final key.
    pub fn try_set(
        &mut self,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, PathError> {
        let keys = try_parse_path(path)?;
        self.set_at(&keys, value.into())
    }

    /// Set a value at an already parsed path, returning the value previously
    /// stored at the final key.
    ///
    /// # Errors
    ///
    /// [`PathError::NoSegments`] if `keys` is empty; the container is left
    /// unchanged.
    pub fn set_at(&mut self, keys: &[String], value: Value) -> Result<Option<Value>, PathError> {
        let Some((last, parents)) = keys.split_last() else {
            return Err(PathError::NoSegments(String::new()));
        };
        let mut map = self;
        for key in parents {
            let slot = map
                .contents
                .entry(key.clone())
                .or_insert_with(|| Value::Map(NestedMap::new()));
            if !matches!(slot, Value::Map(_)) {
                tracing::debug!(
                    key = %key,
                    replaced = slot.kind(),
                    "replacing intermediate value with an empty container"
                );
                *slot = Value::Map(NestedMap::new());
            }
            map = match slot {
                Value::Map(child) => child,
                _ => unreachable!("intermediate slot holds a container"),
            };
        }
        Ok(map.contents.insert(last.clone(), value))
    }
}

/// Children are released with an explicit work list, so dropping a tree of
/// any depth does not recurse.
impl Drop for NestedMap {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(&mut self.contents, &mut pending);
        while let Some(mut child) = pending.pop() {
            take_children(&mut child.contents, &mut pending);
        }
    }
}

fn take_children(contents: &mut IndexMap<String, Value>, pending: &mut Vec<NestedMap>) {
    if !contents.values().any(|v| matches!(v, Value::Map(_) | Value::Maps(_))) {
        return;
    }
    for (_, value) in contents.drain(..) {
        match value {
            Value::Map(map) => pending.push(map),
            Value::Maps(maps) => pending.extend(maps),
            _ => {}
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NestedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            contents: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NestedMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.contents.iter()
    }
}

impl IntoIterator for NestedMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_entries().into_iter()
    }
}
