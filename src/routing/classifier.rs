//! Request classification against the reserved prefix.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The bare prefix redirects rather than proxying, so relative links
//!   under the prefix resolve correctly
//! - A path that merely shares a string prefix (`/blogging`) passes through

/// Where a request goes, decided from its path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Path equals the bare prefix; redirect to the slash-terminated form.
    NormalizeSlash,
    /// Path is under the prefix; forward to the secondary upstream.
    Proxy,
    /// Everything else; forward to the default origin.
    PassThrough,
}

/// Classify a request path against the reserved prefix.
///
/// Total over all inputs; there is no unroutable state.
pub fn classify(path: &str, prefix: &str) -> RouteClass {
    if path == prefix {
        return RouteClass::NormalizeSlash;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => RouteClass::Proxy,
        _ => RouteClass::PassThrough,
    }
}
