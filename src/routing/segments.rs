//! Wildcard path capture.
//!
//! A mount captures whatever follows its prefix. The capture is either empty
//! (`/api/orders`, `/api/orders/`) or an ordered list of raw, still
//! percent-encoded segments (`/api/orders/42/items` → `["42", "items"]`).
//!
//! Segments that a URL parser would treat as `.` or `..` (including the
//! `%2e` spellings) and segments containing `\` are refused: the upstream
//! client resolves them, which would move the target outside the mount's
//! resource.

use thiserror::Error;

/// Reasons a path cannot be captured by a mount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("path is not under mount prefix {0}")]
    OutsidePrefix(String),

    #[error("path segment {0:?} is not allowed")]
    Forbidden(String),
}

/// Trailing path segments captured after a mount prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegments {
    /// Nothing follows the prefix.
    Empty,
    /// One or more non-empty segments, in request order.
    Captured(Vec<String>),
}

impl PathSegments {
    /// Split the remainder of a path (the part after the mount prefix).
    ///
    /// Empty segments produced by repeated or trailing slashes are dropped.
    pub fn from_remainder(remainder: &str) -> Result<Self, SegmentError> {
        let mut segments = Vec::new();
        for segment in remainder.split('/').filter(|s| !s.is_empty()) {
            if is_dot_segment(segment) || segment.contains('\\') {
                return Err(SegmentError::Forbidden(segment.to_string()));
            }
            segments.push(segment.to_string());
        }

        if segments.is_empty() {
            Ok(PathSegments::Empty)
        } else {
            Ok(PathSegments::Captured(segments))
        }
    }

    /// Capture the segments of `path` that follow `prefix`.
    ///
    /// Fails when `path` is not under `prefix` (for example `/api/ordersX`
    /// against `/api/orders`) or holds a forbidden segment.
    pub fn capture(path: &str, prefix: &str) -> Result<Self, SegmentError> {
        let outside = || SegmentError::OutsidePrefix(prefix.to_string());
        let rest = path.strip_prefix(prefix).ok_or_else(outside)?;
        if rest.is_empty() || rest.starts_with('/') {
            Self::from_remainder(rest)
        } else {
            Err(outside())
        }
    }

    /// Path suffix to append to the upstream resource segment: empty, or
    /// `/` followed by the segments joined with `/`.
    pub fn suffix(&self) -> String {
        match self {
            PathSegments::Empty => String::new(),
            PathSegments::Captured(segments) => format!("/{}", segments.join("/")),
        }
    }
}

/// `.` or `..`, literal or percent-encoded in any case.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | "%2e" | ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}
