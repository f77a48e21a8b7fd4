//! HTTP backend for the AI lure designer.
//!
//! [`app`] builds the full router so the binary and the integration tests
//! serve exactly the same surface.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod ai;
pub mod config;
pub mod error;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

/// Catalog and render endpoints, mounted under `/api`
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/lures", get(routes::list_lures))
        .route("/patterns", get(routes::list_patterns))
        .route("/render", post(routes::render_lure))
        .route("/chat", post(routes::chat))
}

pub fn app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!("request", method = %req.method(), uri = %req.uri())
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = res.status().as_u16(),
                latency_ms = latency.as_millis() as u64,
                "finished processing request"
            );
        });

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .nest("/api", api_routes())
        .layer(trace_layer)
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Single trusted origin with credentials. Other origins get no CORS headers.
/// Wildcards are not allowed together with credentials, so methods and
/// headers are mirrored from the preflight.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([config.allowed_origin.clone()]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
