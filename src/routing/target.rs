//! Upstream target URL construction.

use std::fmt;

use crate::config::UpstreamBase;
use crate::routing::segments::PathSegments;

/// Fully qualified upstream URL for one request.
///
/// Shape: `{base}{resource}{suffix}{?query}`. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget(String);

impl UpstreamTarget {
    /// Build a target from its parts. The query is appended verbatim when the
    /// inbound request carried a non-empty one.
    pub fn build(
        base: &UpstreamBase,
        resource: &str,
        segments: &PathSegments,
        query: Option<&str>,
    ) -> Self {
        let mut url = format!("{}{}{}", base, resource, segments.suffix());
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(q);
        }
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
