//! HTTP server setup for the registry facade.
//!
//! # Responsibilities
//! - Build the Axum router over the shared registry
//! - Wire up middleware (request timeout, tracing)
//! - Serve with graceful shutdown on the registry's signal

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ListenerConfig;
use crate::http::handlers;
use crate::registry::core::ServiceRegistry;

/// HTTP facade over a [`ServiceRegistry`].
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the server for the given registry.
    pub fn new(registry: Arc<ServiceRegistry>, config: &ListenerConfig) -> Self {
        let router = Self::build_router(registry, config);
        Self { router }
    }

    fn build_router(registry: Arc<ServiceRegistry>, config: &ListenerConfig) -> Router {
        Router::new()
            .route(
                "/services",
                post(handlers::register).get(handlers::list_services),
            )
            .route("/services/healthy", get(handlers::list_healthy))
            .route("/services/tag/{tag}", get(handlers::find_by_tag))
            .route("/services/{name}", delete(handlers::unregister))
            .route("/services/{name}/report", post(handlers::report))
            .route("/resolve/{name}", get(handlers::resolve))
            .route("/pick/{prefix}", get(handlers::pick_by_prefix))
            .route("/health", get(handlers::health))
            .with_state(registry)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on the given listener until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Registry API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Registry API stopped");
        Ok(())
    }
}
