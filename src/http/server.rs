//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (security headers, gatekeeper, timeout, body limit,
//!   tracing)
//! - Run the server on a bound listener with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::error::SecurityError;
use crate::http::assets::AssetStore;
use crate::http::handlers;
use crate::observability::audit::SecurityLog;
use crate::security::gatekeeper::{gatekeeper_middleware, Gatekeeper};
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::RateLimiter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gatekeeper: Arc<Gatekeeper>,
    pub form_limiter: Arc<RateLimiter>,
    pub assets: Arc<AssetStore>,
}

/// HTTP server for the site.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: SiteConfig) -> Result<Self, std::io::Error> {
        let audit = Arc::new(SecurityLog::open(
            config.audit.path.clone().into(),
            config.audit.max_size_bytes,
            config.audit.max_backups,
        )?);
        let gatekeeper = Arc::new(Gatekeeper::new(&config, audit));
        let form_limiter = Arc::new(RateLimiter::new(
            config.rate_limit.form_limit,
            Duration::from_secs(config.rate_limit.form_window_secs),
        ));
        let assets = Arc::new(AssetStore::new(config.assets.dir.clone()));

        let state = AppState {
            gatekeeper: gatekeeper.clone(),
            form_limiter,
            assets,
        };

        Ok(Self {
            router: Self::build_router(&config, state, gatekeeper),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layer order, outermost first: trace, security headers, 413 normalizer,
    /// body limit, timeout, gatekeeper. The headers layer sits outside the
    /// body limit so even a 413 carries the header set; the gatekeeper is
    /// innermost so it only ever buffers bodies the limit layer already
    /// accepted. Axum applies the last-added layer first, hence the reversed
    /// calls below.
    fn build_router(config: &SiteConfig, state: AppState, gatekeeper: Arc<Gatekeeper>) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/styles.css", get(handlers::styles))
            .route("/script.js", get(handlers::script))
            .route("/submit-form", post(handlers::submit_form))
            .route("/health", get(handlers::health))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                gatekeeper,
                gatekeeper_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(middleware::map_response(normalize_payload_too_large))
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the shutdown signal resolves.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
    }
}

/// The body-limit layer answers an oversize `Content-Length` with a bare 413
/// before the request reaches the pipeline. Rewrite that into the uniform
/// JSON error shape; pipeline-produced 413s are already JSON and pass through.
async fn normalize_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return SecurityError::PayloadTooLarge.into_response();
    }
    response
}
