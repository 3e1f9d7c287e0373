//! Internal forwarding into the content service.
//!
//! # Responsibilities
//! - Rewrite the request URI to the percent-encoded redirect target (query preserved)
//! - Record the original path as a request extension
//! - Dispatch directly into the content service, skipping the vanity filter
//!
//! # Design Decisions
//! - Forwarding never leaves the process (no client-visible redirect)
//! - The wrapped router is the terminal handler, so a forward cannot loop

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{uri::PathAndQuery, Request, Uri},
    response::Response,
    Router,
};
use tower::ServiceExt;

use crate::content::{DispatchError, Dispatcher, ForwardHandle, Resource};
use crate::http::request::encode_path;

/// Extension attached to forwarded requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanityForward {
    /// Request path before the forward.
    pub original_path: String,
    /// Path the request was forwarded to.
    pub target: String,
}

/// Dispatcher that forwards into an in-process axum service.
#[derive(Clone)]
pub struct InternalDispatcher {
    router: Router,
}

impl InternalDispatcher {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Dispatcher for InternalDispatcher {
    fn dispatcher_for(&self, resource: &Resource) -> Result<Box<dyn ForwardHandle>, DispatchError> {
        let target = resource
            .target()
            .ok_or_else(|| DispatchError::NoDispatcher(resource.path.clone()))?;

        Ok(Box::new(InternalForward {
            router: self.router.clone(),
            target: target.to_string(),
        }))
    }
}

struct InternalForward {
    router: Router,
    target: String,
}

impl InternalForward {
    fn rewrite_uri(&self, uri: &Uri) -> Result<Uri, DispatchError> {
        let invalid = |reason: String| DispatchError::InvalidTarget {
            target: self.target.clone(),
            reason,
        };

        if !self.target.starts_with('/') {
            return Err(invalid("not an absolute path".to_string()));
        }

        let path = encode_path(&self.target);
        let path_and_query = match uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };

        let mut parts = uri.clone().into_parts();
        parts.path_and_query =
            Some(PathAndQuery::try_from(path_and_query).map_err(|e| invalid(e.to_string()))?);
        Uri::from_parts(parts).map_err(|e| invalid(e.to_string()))
    }
}

#[async_trait]
impl ForwardHandle for InternalForward {
    async fn forward(&self, mut request: Request<Body>) -> Result<Response, DispatchError> {
        let original_path = request.uri().path().to_string();
        *request.uri_mut() = self.rewrite_uri(request.uri())?;
        request.extensions_mut().insert(VanityForward {
            original_path,
            target: self.target.clone(),
        });

        match self.router.clone().oneshot(request).await {
            Ok(response) => Ok(response),
            Err(never) => match never {},
        }
    }
}
