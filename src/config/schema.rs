//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single prefixed route forwarded to the secondary upstream.
    pub route: RouteConfig,

    /// Edge cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How the fetch executor treats upstream redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    /// Return 3xx responses as-is so `Location` can be rewritten.
    #[default]
    Manual,
    /// Chase upstream redirects; the client only sees the final response.
    Follow,
}

/// The prefixed route and its rewriting behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Host the site is published under (e.g., "public.example").
    pub public_host: String,

    /// Reserved path prefix, no trailing slash (e.g., "/blog").
    pub reserved_prefix: String,

    /// Authority of the secondary upstream (e.g., "blog.internal:2368").
    pub upstream_authority: String,

    /// Authority of the default origin serving all non-prefixed paths.
    pub default_origin: String,

    /// Remove the reserved prefix before forwarding upstream.
    pub strip_prefix: bool,

    /// Redirect handling on the upstream fetch.
    pub redirect_mode: RedirectMode,

    /// Rewrite `Set-Cookie` Path/Domain attributes for the public host.
    pub rewrite_cookies: bool,

    /// Regex patterns; a matching upstream path-and-query is never cached.
    pub cache_exclusions: Vec<String>,

    /// Name of the forwarded-for header sent upstream.
    pub forwarded_for_header: String,

    /// Edge-platform header carrying the original client address.
    pub client_ip_header: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            public_host: "localhost".to_string(),
            reserved_prefix: "/blog".to_string(),
            upstream_authority: "127.0.0.1:2368".to_string(),
            default_origin: "127.0.0.1:3000".to_string(),
            strip_prefix: true,
            redirect_mode: RedirectMode::Manual,
            rewrite_cookies: false,
            cache_exclusions: Vec::new(),
            forwarded_for_header: "x-forwarded-for".to_string(),
            client_ip_header: "x-real-ip".to_string(),
        }
    }
}

/// Edge cache configuration. Expiry is owned by the store, not the pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the edge cache.
    pub enabled: bool,

    /// Maximum number of cached responses.
    pub max_capacity: u64,

    /// Time-to-live for cached responses in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 10_000,
            ttl_secs: 300,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
