//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, pipeline dispatch)
//!     → request.rs (add request ID)
//!     → [classifier decides: normalize / proxy / pass-through]
//!     → fetch.rs (upstream call, redirect mode)
//!     → [rewriter adjusts Location / Set-Cookie]
//!     → Send to client
//! ```

pub mod fetch;
pub mod request;
pub mod server;

pub use fetch::{FetchError, FetchExecutor};
pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
