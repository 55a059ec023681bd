//! Nested JSON objects addressed by bracket paths.
//!
//! A [`NestedMap`] holds a JSON object as a tree of containers. Values deep
//! inside it are read and written with a single path string such as
//! `[A][B][C]` instead of walking intermediate maps by hand.
//!
//! - [`parse_path`] turns `[A][B][C]` into `["A", "B", "C"]`.
//! - [`NestedMap::get`] walks the tree, indexing into sequences of
//!   containers with a numeric segment (`[U][0][A]`).
//! - [`NestedMap::set`] creates missing intermediate containers and
//!   overwrites intermediates that are not containers.
//! - Decoding wraps every JSON object into a [`NestedMap`]; encoding strips
//!   the wrappers again, so the JSON output looks like any plain object.
//!
//! A tree has a single owner and is mutated through `&mut`, so there is at
//! most one writer at a time.
//!
//! # Example
//!
//! ```
//! use nested_map::NestedMap;
//!
//! let mut map = NestedMap::from_json_str(r#"{"A": {"B": {"C": {"D": "value"}}}}"#).unwrap();
//!
//! assert_eq!(map.get("[A][B][C][D]").and_then(|v| v.as_str()), Some("value"));
//! assert!(map.get("[A][B][C][DD]").is_none());
//!
//! assert!(map.set("[A][B][C][E]", "OK"));
//! assert_eq!(
//!     map.to_json_string().unwrap(),
//!     r#"{"A":{"B":{"C":{"D":"value","E":"OK"}}}}"#
//! );
//! ```

use thiserror::Error;

pub mod codec;
pub mod map;
pub mod path;
pub mod types;

pub use codec::{CodecError, DecodeOptions, DEFAULT_MAX_DEPTH};
pub use map::{LookupError, NestedMap};
pub use path::{format_path, parse_index, parse_path, try_parse_path, PathError};
pub use types::{Path, PathStep, Value};

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum NestedMapError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(json: &str) -> Result<NestedMap, NestedMapError> {
        Ok(NestedMap::from_json_str(json)?)
    }

    fn lookup<'a>(map: &'a NestedMap, path: &str) -> Result<&'a Value, NestedMapError> {
        Ok(map.try_get(path)?)
    }

    #[test]
    fn test_error_conversions() {
        assert!(matches!(load("{"), Err(NestedMapError::Codec(_))));

        let map = load(r#"{"a": 1}"#).unwrap();
        assert_eq!(lookup(&map, "[a]").unwrap(), &Value::from(1));
        assert!(matches!(
            lookup(&map, "[b]"),
            Err(NestedMapError::Lookup(LookupError::NotFound(_)))
        ));

        let err: NestedMapError = PathError::NoSegments("x".to_string()).into();
        assert_eq!(err.to_string(), r#"path "x" contains no [key] segments"#);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LookupError::NotFound("[a][b]".to_string()).to_string(),
            "no value at path [a][b]"
        );
        assert_eq!(
            CodecError::NotAnObject("array").to_string(),
            "nested map root must be an object, found array"
        );
        assert_eq!(
            CodecError::TooDeep(DEFAULT_MAX_DEPTH).to_string(),
            "nested map is deeper than the limit of 10000 levels"
        );
    }

    #[test]
    fn test_reexports() {
        let path = parse_path("[a][0]").unwrap();
        assert_eq!(format_path(&path), "[a][0]");
        assert_eq!(parse_index(&path[1]), Some(0));

        let map = NestedMap::from_json_value_with(
            json!({"a": [{"b": 1}]}),
            &DecodeOptions::default().wrap_object_arrays(true),
        )
        .unwrap();
        let keys = ["a".to_string(), "0".to_string(), "b".to_string()];
        assert_eq!(map.get_at(&keys), Some(&Value::from(1)));
    }
}
