//! Bracket path parsing: `[A][B][C]` → `["A", "B", "C"]`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::types::Path;

/// Non-greedy: every `[` captures up to the first `]` that follows at least
/// one character.
const SEGMENT_PATTERN: &str = r"\[(.+?)\]";

/// A path string that cannot address anything.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// No `[key]` group was found; the payload is the offending path.
    #[error("path {0:?} contains no [key] segments")]
    NoSegments(String),
}

fn segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEGMENT_PATTERN).expect("segment pattern is a valid regex"))
}

/// Parse a bracket path into its key segments.
///
/// Returns `None` when the string holds no bracket group at all. That is
/// "no path", which callers must not confuse with the root.
///
/// Keys are taken verbatim: there is no escaping, and a key ends at the first
/// `]`. Empty brackets never form a segment on their own, so `[][A]` yields
/// the single key `"][A"`.
///
/// # Example
///
/// ```
/// use nested_map::parse_path;
///
/// assert_eq!(parse_path("[A][B][C]"), Some(vec!["A".into(), "B".into(), "C".into()]));
/// assert_eq!(parse_path("prefix[a b]suffix[0]"), Some(vec!["a b".into(), "0".into()]));
/// assert_eq!(parse_path("A.B.C"), None);
/// assert_eq!(parse_path(""), None);
/// ```
pub fn parse_path(path: &str) -> Option<Path> {
    let segments: Path = segment_regex()
        .captures_iter(path)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    if segments.is_empty() {
        tracing::debug!(path, "path has no bracket segments");
        return None;
    }
    Some(segments)
}

/// Like [`parse_path`], but reports "no path" as an error.
pub fn try_parse_path(path: &str) -> Result<Path, PathError> {
    parse_path(path).ok_or_else(|| PathError::NoSegments(path.to_string()))
}

/// Format key segments back into a bracket path.
///
/// Keys containing `]` are written as-is and will not parse back to the same
/// segments.
///
/// # Example
///
/// ```
/// use nested_map::format_path;
///
/// assert_eq!(format_path(&["A".to_string(), "B".to_string()]), "[A][B]");
/// assert_eq!(format_path(&[]), "");
/// ```
pub fn format_path(path: &[String]) -> String {
    let mut out = String::with_capacity(path.iter().map(|s| s.len() + 2).sum());
    for step in path {
        out.push('[');
        out.push_str(step);
        out.push(']');
    }
    out
}

/// Parse a segment as an index into a sequence of containers.
///
/// Returns `None` unless the segment is a non-negative integer that fits in
/// `usize`.
///
/// # Example
///
/// ```
/// use nested_map::parse_index;
///
/// assert_eq!(parse_index("0"), Some(0));
/// assert_eq!(parse_index("12"), Some(12));
/// assert_eq!(parse_index("-1"), None);
/// assert_eq!(parse_index("first"), None);
/// ```
pub fn parse_index(step: &str) -> Option<usize> {
    step.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Path {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse_path("[A]"), Some(keys(&["A"])));
        assert_eq!(parse_path("[A][B][C][D]"), Some(keys(&["A", "B", "C", "D"])));
    }

    #[test]
    fn test_parse_ignores_text_between_groups() {
        assert_eq!(parse_path("x[A] . [B]y"), Some(keys(&["A", "B"])));
    }

    #[test]
    fn test_parse_keeps_key_characters() {
        assert_eq!(parse_path("[a b][c.d][é][ ]"), Some(keys(&["a b", "c.d", "é", " "])));
        assert_eq!(parse_path("[[A]"), Some(keys(&["[A"])));
    }

    #[test]
    fn test_parse_non_greedy() {
        assert_eq!(parse_path("[A]]"), Some(keys(&["A"])));
        assert_eq!(parse_path("[][A]"), Some(keys(&["][A"])));
    }

    #[test]
    fn test_parse_no_path() {
        assert_eq!(parse_path(""), None);
        assert_eq!(parse_path("A/B"), None);
        assert_eq!(parse_path("[]"), None);
        assert_eq!(parse_path("[A"), None);
        assert_eq!(parse_path("A]"), None);
    }

    #[test]
    fn test_try_parse_path() {
        assert_eq!(try_parse_path("[x]"), Ok(keys(&["x"])));
        assert_eq!(
            try_parse_path("nope"),
            Err(PathError::NoSegments("nope".to_string()))
        );
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&keys(&["A", "0", "b c"])), "[A][0][b c]");
        let path = keys(&["x", "y"]);
        assert_eq!(parse_path(&format_path(&path)), Some(path));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("1.5"), None);
        assert_eq!(parse_index("A"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("99999999999999999999999"), None);
    }
}
