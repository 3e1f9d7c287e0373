//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (request ID, resource path)
//!     → middleware/vanity.rs (resolve: forward or pass through)
//!     → content service (terminal handler, also the forward destination)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{decode_path, encode_path, resource_path, RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
