//! Content subsystem: the boundary between the vanity filter and the host.
//!
//! # Data Flow
//! ```text
//! vanity key
//!     → ContentResolver::resolve (store.rs in-process, or a custom backend)
//!     → Resource (type tag + attributes)
//!
//! Forward decision
//!     → Dispatcher::dispatcher_for(resource)
//!     → ForwardHandle::forward(request) (dispatch.rs: into the content service)
//! ```
//!
//! # Design Decisions
//! - A miss is a resource of type `sling:nonexisting`, never an error
//! - Only I/O level faults surface as `ContentError`
//! - Traits are object safe so backends can be swapped behind `Arc<dyn _>`

pub mod dispatch;
pub mod store;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dispatch::{InternalDispatcher, VanityForward};
pub use store::ContentStore;

/// Resource type of a vanity redirect entry.
pub const REDIRECT_RESOURCE_TYPE: &str = "sling:redirect";

/// Resource type reported for paths that do not resolve to anything.
pub const NON_EXISTING_RESOURCE_TYPE: &str = "sling:nonexisting";

/// Attribute carrying a redirect's forward destination.
pub const TARGET_ATTRIBUTE: &str = "sling:target";

/// A resolved content node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Path the resource was resolved from.
    pub path: String,

    /// Type tag, e.g. `sling:redirect`.
    pub resource_type: String,

    /// String-valued properties.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Resource {
    pub fn new(path: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
        }
    }

    /// A vanity redirect pointing at `target`.
    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(path, REDIRECT_RESOURCE_TYPE).with_attribute(TARGET_ATTRIBUTE, target)
    }

    /// The "not found" marker for `path`.
    pub fn non_existing(path: impl Into<String>) -> Self {
        Self::new(path, NON_EXISTING_RESOURCE_TYPE)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn exists(&self) -> bool {
        self.resource_type != NON_EXISTING_RESOURCE_TYPE
    }

    pub fn is_redirect(&self) -> bool {
        self.resource_type == REDIRECT_RESOURCE_TYPE
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The declared forward destination, if any.
    pub fn target(&self) -> Option<&str> {
        self.attribute(TARGET_ATTRIBUTE)
    }
}

/// Failure of the content backend while resolving a path.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content backend unavailable: {0}")]
    Unavailable(String),
}

/// Failure to obtain a dispatcher or to perform the forward.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no dispatcher available for resource '{0}'")]
    NoDispatcher(String),

    #[error("invalid forward target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Resolves content paths to resources.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Resolve `path`. Misses are returned as [`Resource::non_existing`].
    async fn resolve(&self, path: &str) -> Result<Resource, ContentError>;
}

/// Hands out forward handles for resolved resources.
pub trait Dispatcher: Send + Sync {
    fn dispatcher_for(&self, resource: &Resource) -> Result<Box<dyn ForwardHandle>, DispatchError>;
}

/// Performs an internal forward of the current request.
#[async_trait]
pub trait ForwardHandle: Send + Sync {
    async fn forward(&self, request: Request<Body>) -> Result<Response, DispatchError>;
}
