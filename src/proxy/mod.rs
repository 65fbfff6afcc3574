//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! mount route matched (routing)
//!     → forward.rs (build target, forward method/headers/body)
//!     → headers.rs (strip Host; correct response headers)
//!     → cookies.rs (split folded Set-Cookie values)
//!     → streamed response to client
//!
//! POST /api/chat
//!     → chat.rs (parse JSON, cookie-only forwarding, sanitised errors)
//! ```
//!
//! # Design Decisions
//! - Pure pass-through: upstream statuses and bodies are never interpreted
//! - Redirects are relayed, not followed
//! - No caching, no retries

pub mod chat;
pub mod cookies;
pub mod error;
pub mod forward;
pub mod headers;

pub use chat::{chat_handler, ChatState};
pub use error::ProxyError;
pub use forward::{proxy_handler, MountState};
