//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → classifier.rs (compare against reserved prefix)
//!     → Return: NormalizeSlash | Proxy | PassThrough
//! ```
//!
//! # Design Decisions
//! - Classification is a pure, total function of the path
//! - Exactly one reserved prefix; everything else is pass-through
//! - No regex in hot path (prefix matching only)

pub mod classifier;

pub use classifier::{classify, RouteClass};
