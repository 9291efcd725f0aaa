use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::core::dispatch::Dispatcher;
use crate::infra::config::{Config, TransportKind};
use crate::infra::http::{json, ndjson, sse};
use crate::tools::search::SearchBackend;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub sse: sse::SseTransport,
    pub reshape_results: bool,
}

impl AppState {
    pub fn new(search: Arc<dyn SearchBackend>, heartbeat: Duration, reshape_results: bool) -> Self {
        Self {
            dispatcher: Dispatcher::new(search),
            sse: sse::SseTransport::new(heartbeat),
            reshape_results,
        }
    }

    pub fn from_config(search: Arc<dyn SearchBackend>, cfg: &Config) -> Self {
        Self::new(search, cfg.heartbeat(), cfg.reshape_results)
    }
}

fn transport_routes(kind: TransportKind) -> MethodRouter<AppState> {
    let routes = match kind {
        TransportKind::Ndjson => get(ndjson::get).post(ndjson::post),
        TransportKind::Json => get(json::get).post(json::post),
        TransportKind::Sse => get(sse::get).post(sse::post),
    };
    routes.options(options)
}

const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type,Authorization,x-session-id";

/// Plain `OPTIONS` without preflight headers; real preflights are answered by
/// [`cors_layer`] before reaching this.
async fn options() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
        ],
    )
}

/// Answers browser preflights for every route and tags responses with `*`.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-session-id"),
        ])
}

/// Full app: health, REST search and the MCP transports.
///
/// `root` selects which transport also answers at `/`.
pub fn build_app(state: AppState, root: TransportKind) -> Router {
    Router::new()
        .route("/", transport_routes(root))
        .route("/api/mcp", transport_routes(TransportKind::Ndjson))
        .route("/api/mcp/rpc", transport_routes(TransportKind::Json))
        .route("/api/mcp/sse", transport_routes(TransportKind::Sse))
        .route("/api/search", get(crate::api::search::search))
        .route("/api/health", get(crate::api::health::health))
        .route("/healthz", get(|| async { "ok" }))
        .layer(cors_layer())
        .with_state(state)
}
