//! HTTP API for Page-Lens
//!
//! Two endpoints:
//! - `GET /api/v1/analyze` analyses a page and, with deep analysis, registers
//!   the pending link scan in the deferred-result cache
//! - `GET /api/v1/advancedLinkData/:id` collects a deferred link scan; without
//!   an id it answers 404 with an explanatory body

mod error;
mod handlers;

pub use error::ApiError;

use crate::analysis::{build_http_client, DeferredHrefData, PageAnalyzer};
use crate::cache::DeferredCache;
use crate::config::Config;
use crate::source::{HtmlSource, HttpHtmlSource};
use crate::LensError;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state of the HTTP service
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<PageAnalyzer>,
    source: Arc<dyn HtmlSource>,
    cache: Arc<DeferredCache<DeferredHrefData>>,
    public_base_url: Option<String>,
}

impl AppState {
    pub fn new(
        analyzer: Arc<PageAnalyzer>,
        source: Arc<dyn HtmlSource>,
        cache: Arc<DeferredCache<DeferredHrefData>>,
    ) -> Self {
        Self {
            analyzer,
            source,
            cache,
            public_base_url: None,
        }
    }

    /// Advertise deferred-result links under `base` instead of the Host header
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = Some(base.into());
        self
    }

    /// Builds the analyzer, HTML source and cache from configuration
    ///
    /// Must be called from within a Tokio runtime so the cache sweep starts.
    pub fn from_config(config: &Config) -> Result<Self, LensError> {
        let client = build_http_client(&config.user_agent, config.analysis.probe_timeout())?;
        let analyzer = PageAnalyzer::from_config(config)?;
        let cache = DeferredCache::new(config.analysis.cache_lifespan());

        let mut state = Self::new(
            Arc::new(analyzer),
            Arc::new(HttpHtmlSource::new(client)),
            Arc::new(cache),
        );
        state.public_base_url = config.server.public_base_url.clone();
        Ok(state)
    }

    pub fn cache(&self) -> &DeferredCache<DeferredHrefData> {
        &self.cache
    }
}

/// Build the axum Router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/analyze", get(handlers::analyze))
        .route(
            "/api/v1/advancedLinkData",
            get(handlers::missing_link_data_id),
        )
        .route(
            "/api/v1/advancedLinkData/",
            get(handlers::missing_link_data_id),
        )
        .route(
            "/api/v1/advancedLinkData/:id",
            get(handlers::advanced_link_data),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the API until Ctrl-C, then disposes the cache
pub async fn serve(config: &Config, state: AppState) -> Result<(), LensError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Page-Lens listening on http://{}", listener.local_addr()?);

    let cache = Arc::clone(&state.cache);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.dispose();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
