//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: content service behind the vanity filter
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Apply configuration updates while serving
//! - Graceful shutdown

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FilterConfig;
use crate::content::{ContentStore, InternalDispatcher, VanityForward};
use crate::http::middleware::{vanity_filter, VanityState};
use crate::http::request::{decode_path, propagate_request_id_layer, resource_path, set_request_id_layer};
use crate::observability::metrics;
use crate::vanity::VanityResolver;

/// Application state injected into the content handler.
#[derive(Clone)]
pub struct AppState {
    pub store: ContentStore,
}

/// HTTP server hosting the vanity filter.
pub struct HttpServer {
    router: Router,
    resolver: Arc<VanityResolver>,
    store: ContentStore,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        let resolver = Arc::new(VanityResolver::new());
        let store = ContentStore::from_resources(config.content.clone());
        let router = Self::build_router(&config, resolver.clone(), store.clone());

        let server = Self {
            router,
            resolver,
            store,
        };
        server.apply_vanity(&config);
        server
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FilterConfig, resolver: Arc<VanityResolver>, store: ContentStore) -> Router {
        let content = Router::new()
            .fallback(content_handler)
            .with_state(AppState { store: store.clone() });

        let vanity = VanityState::new(
            resolver,
            Arc::new(store),
            Arc::new(InternalDispatcher::new(content.clone())),
        );

        content
            .layer(middleware::from_fn_with_state(vanity, vanity_filter))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    fn apply_vanity(&self, config: &FilterConfig) {
        let count = self.resolver.configure(config.vanity.root_paths.as_ref());
        metrics::record_reload(count);
    }

    /// Apply a reloaded configuration: replace content, then swap the rule set.
    ///
    /// Only the rule set swaps atomically. Content is upserted entry by entry
    /// before the new rules go live, so a request resolved under the new rules
    /// always sees the new content. A request still on the old rules may see a
    /// mix of old and new entries. Listener and timeout changes need a restart.
    pub fn apply(&self, config: &FilterConfig) {
        self.store.replace(config.content.clone());
        self.apply_vanity(config);
        tracing::info!(content = self.store.len(), "Configuration reloaded");
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<FilterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.clone();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .into_future();
        tokio::pin!(server);

        loop {
            tokio::select! {
                result = &mut server => {
                    result?;
                    break;
                }
                Some(new_config) = config_updates.recv() => {
                    self.apply(&new_config);
                }
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered application, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Terminal handler: serves the resource at the request's resource path.
async fn content_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let decoded = decode_path(request.uri().path());
    let path = resource_path(&decoded);

    if let Some(forward) = request.extensions().get::<VanityForward>() {
        tracing::debug!(original_path = %forward.original_path, target = %forward.target, "Serving forwarded request");
    }

    match state.store.get(path) {
        Some(resource) => Json(resource).into_response(),
        None => (StatusCode::NOT_FOUND, "Resource not found").into_response(),
    }
}
