//! Vanity path filter library.
//!
//! Intercepts requests under administratively declared root paths and, when the
//! remaining path names a vanity redirect whose target stays inside the rule's
//! allow-list, forwards the request internally instead of continuing the chain.

pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod vanity;

pub use config::FilterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use vanity::{Decision, VanityResolver};
