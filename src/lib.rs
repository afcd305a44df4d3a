//! Edge prefix proxy library.
//!
//! Presents two independently hosted services as one logical site: requests
//! under a reserved path prefix are forwarded to a secondary upstream with
//! forwarded-context headers and response-header rewriting, everything else
//! passes through to the default origin. Safe responses are cached at the
//! edge without delaying the client.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
