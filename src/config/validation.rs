//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the route is internally consistent (prefix shape, authorities)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.is_empty() {
        errors.push(err("listener.bind_address", "must not be empty"));
    }

    let route = &config.route;
    if route.public_host.is_empty() {
        errors.push(err("route.public_host", "must not be empty"));
    }
    if !route.reserved_prefix.starts_with('/') {
        errors.push(err("route.reserved_prefix", "must start with '/'"));
    }
    if route.reserved_prefix.len() < 2 {
        errors.push(err("route.reserved_prefix", "must name a path segment"));
    }
    if route.reserved_prefix.ends_with('/') {
        errors.push(err("route.reserved_prefix", "must not end with '/'"));
    }
    if route.upstream_authority.is_empty() {
        errors.push(err("route.upstream_authority", "must not be empty"));
    }
    if route.default_origin.is_empty() {
        errors.push(err("route.default_origin", "must not be empty"));
    }
    if route.forwarded_for_header.is_empty() {
        errors.push(err("route.forwarded_for_header", "must not be empty"));
    }
    for (i, pattern) in route.cache_exclusions.iter().enumerate() {
        if let Err(e) = regex::Regex::new(pattern) {
            errors.push(err(
                &format!("route.cache_exclusions[{}]", i),
                format!("invalid regex: {}", e),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be greater than zero"));
    }
    if config.cache.enabled && config.cache.max_capacity == 0 {
        errors.push(err("cache.max_capacity", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.route.reserved_prefix = "blog/".to_string();
        config.route.default_origin = String::new();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
        assert!(errors.iter().any(|e| e.field == "route.reserved_prefix"));
        assert!(errors.iter().any(|e| e.field == "route.default_origin"));
        assert!(errors.iter().any(|e| e.field == "timeouts.request_secs"));
    }

    #[test]
    fn test_rejects_invalid_exclusion_pattern() {
        let mut config = ProxyConfig::default();
        config.route.cache_exclusions = vec!["(unclosed".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "route.cache_exclusions[0]");
    }
}
