//! Remote path handling for drive operations.
//!
//! Paths inside a document library are forward-slash-delimited logical
//! strings, e.g. `"reports/2026/summary.csv"`. Everything in this module is
//! pure string manipulation; no I/O happens here.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{Error, Result};

/// Characters that must be escaped inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Split a remote path into its parent folder path and leaf name.
///
/// A path with no separator denotes a root-level leaf with an empty parent.
/// Leading and trailing separators are ignored.
///
/// # Examples
///
/// ```
/// use sp_drive::path::split;
///
/// assert_eq!(split("reports/2026/summary.csv"), ("reports/2026", "summary.csv"));
/// assert_eq!(split("summary.csv"), ("", "summary.csv"));
/// ```
pub fn split(path: &str) -> (&str, &str) {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", trimmed),
    }
}

/// Return the extension of the path's leaf name, without the dot.
pub fn extension(path: &str) -> Option<&str> {
    let (_, leaf) = split(path);
    match leaf.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Percent-encode a remote path for use inside a Graph URL, segment by
/// segment, preserving the separators.
pub fn encode(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Validate that a remote path is usable, i.e. non-empty after trimming.
pub(crate) fn require_valid(path: &str) -> Result<()> {
    if path.trim_matches('/').trim().is_empty() {
        return Err(Error::InvalidArgument(
            "remote path must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

/// Validate the leaf extension against an allow-list (case-insensitive).
pub(crate) fn require_extension(path: &str, allowed: &[&str]) -> Result<()> {
    if let Some(ext) = extension(path) {
        if allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)) {
            return Ok(());
        }
    }
    Err(Error::InvalidArgument(format!(
        "'{}' does not have a recognized extension (expected one of: {})",
        path,
        allowed.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_nested() {
        assert_eq!(split("a/b/c.csv"), ("a/b", "c.csv"));
    }

    #[test]
    fn test_split_root_leaf() {
        assert_eq!(split("c.csv"), ("", "c.csv"));
    }

    #[test]
    fn test_split_ignores_edge_separators() {
        assert_eq!(split("/a/b.csv"), ("a", "b.csv"));
        assert_eq!(split("a/b.csv/"), ("a", "b.csv"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a/b/c.csv"), Some("csv"));
        assert_eq!(extension("model.RData"), Some("RData"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension(".hidden"), None);
    }

    #[test]
    fn test_encode_spaces() {
        assert_eq!(encode("Shared Documents/out.csv"), "Shared%20Documents/out.csv");
    }

    #[test]
    fn test_encode_keeps_plain_segments() {
        assert_eq!(encode("reports/out.csv"), "reports/out.csv");
    }

    #[test]
    fn test_require_extension_case_insensitive() {
        assert!(require_extension("model.RDS", &["rds"]).is_ok());
        assert!(require_extension("model.csv", &["rds"]).is_err());
    }
}
