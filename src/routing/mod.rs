//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → mount.rs (which local prefix owns the path)
//!     → segments.rs (capture trailing segments after the prefix)
//!     → target.rs (base + resource + suffix + query)
//!     → Return: UpstreamTarget
//!
//! Mount Compilation (at startup):
//!     Upstreams (validated)
//!     → mount_table()
//!     → one axum route set per mount
//! ```
//!
//! # Design Decisions
//! - Mounts compiled at startup, immutable at runtime
//! - Raw (encoded) path used for capture so the upstream sees the same bytes
//! - Dot segments refused so a target never leaves its mount's resource
//! - Target built fresh per request, nothing cached

pub mod mount;
pub mod segments;
pub mod target;

pub use mount::{mount_table, MountKind, ProxyMount};
pub use segments::{PathSegments, SegmentError};
pub use target::UpstreamTarget;
