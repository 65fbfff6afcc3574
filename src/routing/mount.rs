//! Proxy mount table.
//!
//! # Mounts
//! | Local prefix      | Upstream            | Kind    |
//! |-------------------|---------------------|---------|
//! | `/api/careers/*`  | careers `/careers`  | Proxy   |
//! | `/api/orders/*`   | orders `/orders`    | Proxy   |
//! | `/api/auth/*`     | auth `/auth`        | Rewrite |
//! | `/api/users/*`    | auth `/users`       | Rewrite |
//! | `/api/health`     | auth `/health`      | Exact   |
//!
//! The chat endpoint is not a mount; see `proxy::chat`.

use axum::http::Uri;

use crate::config::{UpstreamBase, Upstreams};
use crate::routing::segments::{PathSegments, SegmentError};
use crate::routing::target::UpstreamTarget;

/// How a mount matches paths and relays responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// Wildcard capture; response gets the no-store and Set-Cookie corrections.
    Proxy,
    /// Wildcard capture; response headers relayed as the upstream sent them.
    Rewrite,
    /// Fixed path, no capture; response relayed like `Rewrite`.
    Exact,
}

/// Binding of a local path prefix to an upstream resource.
#[derive(Debug, Clone)]
pub struct ProxyMount {
    /// Mount identifier for logging/metrics.
    pub name: &'static str,
    /// Local path prefix, without trailing slash.
    pub prefix: &'static str,
    /// Upstream base URL.
    pub upstream: UpstreamBase,
    /// Fixed upstream resource segment (e.g. `/orders`).
    pub resource: &'static str,
    pub kind: MountKind,
}

impl ProxyMount {
    pub fn new(
        name: &'static str,
        prefix: &'static str,
        upstream: UpstreamBase,
        resource: &'static str,
        kind: MountKind,
    ) -> Self {
        Self {
            name,
            prefix,
            upstream,
            resource,
            kind,
        }
    }

    /// Whether the mount captures trailing segments.
    pub fn is_wildcard(&self) -> bool {
        !matches!(self.kind, MountKind::Exact)
    }

    /// Whether Cache-Control and Set-Cookie corrections apply to responses.
    pub fn corrects_response(&self) -> bool {
        matches!(self.kind, MountKind::Proxy)
    }

    /// Local axum route paths served by this mount.
    pub fn route_paths(&self) -> Vec<String> {
        if self.is_wildcard() {
            vec![
                self.prefix.to_string(),
                format!("{}/", self.prefix),
                format!("{}/{{*rest}}", self.prefix),
            ]
        } else {
            vec![self.prefix.to_string()]
        }
    }

    /// Segments of the inbound path that follow the prefix.
    pub fn segments(&self, path: &str) -> Result<PathSegments, SegmentError> {
        if !self.is_wildcard() {
            return Ok(PathSegments::Empty);
        }
        PathSegments::capture(path, self.prefix)
    }

    /// Upstream URL for an inbound request URI.
    ///
    /// The target always stays under `{upstream}{resource}`; paths that would
    /// climb out of it are refused.
    pub fn target(&self, uri: &Uri) -> Result<UpstreamTarget, SegmentError> {
        let segments = self.segments(uri.path())?;
        Ok(UpstreamTarget::build(&self.upstream, self.resource, &segments, uri.query()))
    }
}

/// Build the storefront mount table from resolved upstreams.
pub fn mount_table(upstreams: &Upstreams) -> Vec<ProxyMount> {
    vec![
        ProxyMount::new(
            "careers",
            "/api/careers",
            upstreams.careers.clone(),
            "/careers",
            MountKind::Proxy,
        ),
        ProxyMount::new(
            "orders",
            "/api/orders",
            upstreams.orders.clone(),
            "/orders",
            MountKind::Proxy,
        ),
        ProxyMount::new(
            "auth",
            "/api/auth",
            upstreams.auth.clone(),
            "/auth",
            MountKind::Rewrite,
        ),
        ProxyMount::new(
            "users",
            "/api/users",
            upstreams.auth.clone(),
            "/users",
            MountKind::Rewrite,
        ),
        ProxyMount::new(
            "health",
            "/api/health",
            upstreams.auth.clone(),
            "/health",
            MountKind::Exact,
        ),
    ]
}
