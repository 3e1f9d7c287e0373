//! Vanity filter middleware.
//!
//! Sits in front of the content service. Every request either gets forwarded
//! internally to a vanity target or continues down the chain untouched; never both.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::content::{ContentError, ContentResolver, DispatchError, Dispatcher};
use crate::http::request::{decode_path, resource_path, RequestIdExt};
use crate::observability::metrics;
use crate::vanity::{Decision, VanityResolver};

/// State required by the vanity filter.
#[derive(Clone)]
pub struct VanityState {
    pub resolver: Arc<VanityResolver>,
    pub content: Arc<dyn ContentResolver>,
    pub dispatcher: Arc<dyn Dispatcher>,
}

impl VanityState {
    pub fn new(
        resolver: Arc<VanityResolver>,
        content: Arc<dyn ContentResolver>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            resolver,
            content,
            dispatcher,
        }
    }
}

/// A failure that ends the current request.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Resolve(#[from] ContentError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl FilterError {
    fn kind(&self) -> &'static str {
        match self {
            FilterError::Resolve(_) => "resolve",
            FilterError::Dispatch(_) => "dispatch",
        }
    }
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "Vanity resolution failed").into_response()
    }
}

pub async fn vanity_filter(
    State(state): State<VanityState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, FilterError> {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let path = resource_path(&decode_path(request.uri().path())).to_string();

    let result = match state.resolver.resolve(&path, state.content.as_ref()).await {
        Ok(Decision::Forward(forward)) => {
            metrics::record_decision("forward", start);
            tracing::debug!(
                request_id = %request_id,
                path = %path,
                prefix = %forward.prefix,
                target = %forward.target,
                "Forwarding to vanity target"
            );
            match state.dispatcher.dispatcher_for(&forward.resource) {
                Ok(handle) => handle.forward(request).await.map_err(FilterError::from),
                Err(e) => Err(e.into()),
            }
        }
        Ok(Decision::PassThrough) => {
            metrics::record_decision("pass_through", start);
            tracing::debug!(request_id = %request_id, path = %path, "Failed to find any vanity paths");
            return Ok(next.run(request).await);
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = &result {
        metrics::record_failure(e.kind());
        tracing::error!(request_id = %request_id, path = %path, error = %e, "Vanity filter failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::to_bytes, middleware, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    use crate::content::{ContentStore, ForwardHandle, Resource};

    /// Dispatcher answering with the target it was asked for, counting forwards.
    #[derive(Default)]
    struct RecordingDispatcher {
        forwards: Arc<AtomicUsize>,
    }

    struct RecordingForward {
        target: String,
        forwards: Arc<AtomicUsize>,
    }

    impl Dispatcher for RecordingDispatcher {
        fn dispatcher_for(&self, resource: &Resource) -> Result<Box<dyn ForwardHandle>, DispatchError> {
            Ok(Box::new(RecordingForward {
                target: resource.target().unwrap_or_default().to_string(),
                forwards: self.forwards.clone(),
            }))
        }
    }

    #[async_trait]
    impl ForwardHandle for RecordingForward {
        async fn forward(&self, _request: Request<Body>) -> Result<Response, DispatchError> {
            self.forwards.fetch_add(1, Ordering::SeqCst);
            Ok(format!("forwarded:{}", self.target).into_response())
        }
    }

    struct BrokenDispatcher;

    impl Dispatcher for BrokenDispatcher {
        fn dispatcher_for(&self, resource: &Resource) -> Result<Box<dyn ForwardHandle>, DispatchError> {
            Err(DispatchError::NoDispatcher(resource.path.clone()))
        }
    }

    struct OfflineResolver;

    #[async_trait]
    impl ContentResolver for OfflineResolver {
        async fn resolve(&self, _path: &str) -> Result<Resource, ContentError> {
            Err(ContentError::Unavailable("offline".into()))
        }
    }

    fn app(state: VanityState, chain_calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .fallback(get(move || {
                let chain_calls = chain_calls.clone();
                async move {
                    chain_calls.fetch_add(1, Ordering::SeqCst);
                    "chain"
                }
            }))
            .layer(middleware::from_fn_with_state(state, vanity_filter))
    }

    fn state(root_paths: &[&str], dispatcher: Arc<dyn Dispatcher>) -> VanityState {
        let resolver = VanityResolver::new();
        resolver.configure(Some(root_paths));
        let store = ContentStore::from_resources([
            Resource::redirect("/MyVanity", "/content/site/target-page"),
            Resource::redirect("/Escape", "/content/site-other/target-page"),
        ]);
        VanityState::new(Arc::new(resolver), Arc::new(store), dispatcher)
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_forward_skips_chain() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let forwards = dispatcher.forwards.clone();
        let chain = Arc::new(AtomicUsize::new(0));

        let app = app(state(&["/content/site/"], dispatcher), chain.clone());
        let (status, body) = call(app, "/content/site/MyVanity.html").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "forwarded:/content/site/target-page");
        assert_eq!(forwards.load(Ordering::SeqCst), 1);
        assert_eq!(chain.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pass_through_runs_chain_once() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let forwards = dispatcher.forwards.clone();
        let chain = Arc::new(AtomicUsize::new(0));

        let app = app(state(&["/content/site/"], dispatcher), chain.clone());
        let (status, body) = call(app, "/content/site/Escape").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "chain");
        assert_eq!(forwards.load(Ordering::SeqCst), 0);
        assert_eq!(chain.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_fatal() {
        let chain = Arc::new(AtomicUsize::new(0));

        let app = app(state(&["/content/site/"], Arc::new(BrokenDispatcher)), chain.clone());
        let (status, body) = call(app, "/content/site/MyVanity").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Vanity resolution failed");
        assert_eq!(chain.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolver_failure_is_fatal() {
        let chain = Arc::new(AtomicUsize::new(0));
        let resolver = VanityResolver::new();
        resolver.configure(Some(["/content/site/"]));
        let state = VanityState::new(
            Arc::new(resolver),
            Arc::new(OfflineResolver),
            Arc::new(RecordingDispatcher::default()),
        );

        let (status, body) = call(app(state.clone(), chain.clone()), "/content/site/MyVanity").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("offline"));
        assert_eq!(chain.load(Ordering::SeqCst), 0);

        // Paths outside every root never reach the resolver.
        let (status, body) = call(app(state, chain.clone()), "/etc/page").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "chain");
    }
}
