//! Request/response transformation pipeline.
//!
//! # Data Flow
//! ```text
//! Proxy-classified request
//!     → upstream.rs (authority swap, prefix strip, forwarded headers)
//!     → [fetch executor performs the upstream call]
//!     → rewrite.rs (Location and Set-Cookie point back at the public host)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Transforms are pure functions over paths and header maps, so they are
//!   unit-testable without constructing full request/response objects
//! - Rewrites are best-effort: a missing or malformed header is left alone,
//!   never turned into an error

pub mod rewrite;
pub mod upstream;
