//! Cache eligibility.
//!
//! # Design Decisions
//! - Only GET requests are ever cached
//! - Exclusion patterns come from configuration, compiled once; they can
//!   target path segments or query markers, so matching sees the upstream
//!   path together with its query
//! - The same gate decision governs both lookup and store

use axum::http::Method;
use regex::RegexSet;

/// Decides whether a request may be read from or written to the cache.
#[derive(Debug)]
pub struct CacheGate {
    exclusions: RegexSet,
}

impl CacheGate {
    /// Compile the configured exclusion patterns.
    pub fn from_patterns(patterns: &[String]) -> Result<Self, regex::Error> {
        Ok(Self {
            exclusions: RegexSet::new(patterns)?,
        })
    }

    /// A gate with no exclusions; only the GET rule applies.
    pub fn empty() -> Self {
        Self {
            exclusions: RegexSet::empty(),
        }
    }

    /// True when the request may be served from and stored in the cache.
    pub fn is_eligible(&self, method: &Method, path_and_query: &str) -> bool {
        *method == Method::GET && !self.exclusions.is_match(path_and_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> CacheGate {
        CacheGate::from_patterns(&[
            "/ghost/".to_string(),
            "/members/".to_string(),
            "preview=".to_string(),
            "__amp_source_origin".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_plain_get_is_eligible() {
        assert!(gate().is_eligible(&Method::GET, "/post-1"));
        assert!(gate().is_eligible(&Method::GET, "/post-1?page=2"));
    }

    #[test]
    fn test_non_get_is_ineligible() {
        assert!(!gate().is_eligible(&Method::POST, "/post-1"));
        assert!(!gate().is_eligible(&Method::HEAD, "/post-1"));
    }

    #[test]
    fn test_excluded_paths_are_ineligible() {
        assert!(!gate().is_eligible(&Method::GET, "/ghost/api/admin"));
        assert!(!gate().is_eligible(&Method::GET, "/members/account"));
    }

    #[test]
    fn test_query_markers_are_ineligible() {
        assert!(!gate().is_eligible(&Method::GET, "/post-1?preview=true"));
        assert!(!gate().is_eligible(&Method::GET, "/p?__amp_source_origin=x"));
    }

    #[test]
    fn test_empty_pattern_list_excludes_nothing() {
        let open = CacheGate::from_patterns(&[]).unwrap();
        assert!(open.is_eligible(&Method::GET, "/ghost/anything"));
    }
}
