//! HTTP server setup and the proxy pipeline.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Classify each request and drive it through the pipeline:
//!   slash normalization, cache gate, upstream build, fetch, response
//!   rewriting, fire-and-forget cache store
//! - Forward non-prefixed requests to the default origin untouched
//!
//! # Design Decisions
//! - One parameterized pipeline instead of per-deployment entrypoints;
//!   behavior differences live in `RouteConfig`
//! - The cache store is injected so tests can substitute a fake
//! - The cache write never delays the client-facing response

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, Scheme},
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::{self, CacheGate, CachedResponse, MemoryStore, ResponseStore};
use crate::config::{ProxyConfig, RedirectMode};
use crate::http::fetch::FetchExecutor;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::proxy::{rewrite, upstream};
use crate::routing::{classify, RouteClass};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub fetch: FetchExecutor,
    pub gate: Arc<CacheGate>,
    pub store: Option<Arc<dyn ResponseStore>>,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new server with the in-process cache store (when enabled).
    pub fn new(config: ProxyConfig) -> Self {
        let store = config.cache.enabled.then(|| {
            Arc::new(MemoryStore::new(
                config.cache.max_capacity,
                config.cache.ttl_secs,
            )) as Arc<dyn ResponseStore>
        });
        Self::with_store(config, store)
    }

    /// Create a new server with an injected cache capability.
    pub fn with_store(config: ProxyConfig, store: Option<Arc<dyn ResponseStore>>) -> Self {
        let (gate, store) = match CacheGate::from_patterns(&config.route.cache_exclusions) {
            Ok(gate) => (gate, store),
            Err(e) => {
                tracing::error!(error = %e, "Invalid cache exclusion pattern; caching disabled");
                (CacheGate::empty(), None)
            }
        };

        let state = AppState {
            config: Arc::new(config.clone()),
            fetch: FetchExecutor::new(),
            gate: Arc::new(gate),
            store,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.route.reserved_prefix,
            upstream = %self.config.route.upstream_authority,
            default_origin = %self.config.route.default_origin,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler: classify, then dispatch to the matching pipeline arm.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let class = classify(&path, &state.config.route.reserved_prefix);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        class = ?class,
        "Dispatching request"
    );

    let response = match class {
        RouteClass::NormalizeSlash => normalize_slash(&state, &request),
        RouteClass::Proxy => handle_proxy(&state, request, &request_id).await,
        RouteClass::PassThrough => handle_pass_through(&state, request, &request_id).await,
    };

    metrics::record_request(&method, response.status().as_u16(), class, start_time);
    response
}

/// `/prefix` → 301 `/prefix/`, so relative links under the prefix resolve.
fn normalize_slash(state: &AppState, request: &Request<Body>) -> Response {
    let route = &state.config.route;
    let scheme = upstream::original_scheme(request.headers());
    let host = upstream::original_host(request.uri(), request.headers(), route);
    let location = format!(
        "{}{}/",
        upstream::public_origin(scheme, &host),
        route.reserved_prefix
    );

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

/// Forward a non-prefixed request to the default origin, unmodified except
/// for the authority substitution.
async fn handle_pass_through(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
) -> Response {
    let route = &state.config.route;
    let (parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Authority::from_str(&route.default_origin).ok();
    let Ok(uri) = Uri::from_parts(uri_parts) else {
        tracing::error!(request_id = %request_id, "Invalid default origin authority");
        return (StatusCode::BAD_GATEWAY, "Invalid default origin").into_response();
    };

    let mut forwarded = Request::new(body);
    *forwarded.method_mut() = parts.method;
    *forwarded.uri_mut() = uri;
    *forwarded.headers_mut() = parts.headers;
    if let Ok(host) = HeaderValue::from_str(&route.default_origin) {
        forwarded.headers_mut().insert(header::HOST, host);
    }

    match state.fetch.dispatch(forwarded).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Default origin request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// The prefixed arm: cache gate, upstream build, fetch, rewrite, store.
async fn handle_proxy(state: &AppState, request: Request<Body>, request_id: &str) -> Response {
    let route = &state.config.route;
    let (parts, body) = request.into_parts();

    let scheme = upstream::original_scheme(&parts.headers).to_string();
    let host = upstream::original_host(&parts.uri, &parts.headers, route);
    let origin = upstream::public_origin(&scheme, &host);

    // the gate sees the path the upstream will see; the key is derived from
    // the original pre-rewrite request
    let upstream_path =
        upstream::upstream_path(parts.uri.path(), &route.reserved_prefix, route.strip_prefix);
    let upstream_path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", upstream_path, query),
        None => upstream_path,
    };
    let eligible = state.gate.is_eligible(&parts.method, &upstream_path_and_query);
    let key = cache::cache_key(
        &parts.method,
        &scheme,
        &host,
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/"),
    );

    if eligible {
        if let Some(store) = &state.store {
            match store.lookup(&key).await {
                Ok(Some(entry)) => {
                    tracing::debug!(request_id = %request_id, key = %key, "Cache hit");
                    metrics::record_cache_event("hit");
                    return cached_into_response(entry);
                }
                Ok(None) => metrics::record_cache_event("miss"),
                Err(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "Cache lookup failed; treating as miss");
                }
            }
        }
    }

    let body_bytes = if upstream::is_bodyless(&parts.method) {
        None
    } else {
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
                return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
            }
        }
    };

    let upstream_request =
        match upstream::build_upstream_request(&parts, body_bytes.clone(), route) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream request");
                return (StatusCode::BAD_GATEWAY, "Invalid upstream request").into_response();
            }
        };

    let result = match route.redirect_mode {
        RedirectMode::Manual => state.fetch.dispatch(upstream_request).await,
        RedirectMode::Follow => {
            let (parts, _) = upstream_request.into_parts();
            state
                .fetch
                .dispatch_following(parts.method, parts.uri, parts.headers, body_bytes)
                .await
        }
    };
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream request failed");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let (mut response_parts, response_body) = response.into_parts();
    if route.redirect_mode == RedirectMode::Manual {
        rewrite::rewrite_location(&mut response_parts.headers, &origin, route);
    }
    rewrite::rewrite_set_cookie(&mut response_parts.headers, route);

    // archive eligible 200s without delaying the client; the body is
    // buffered once and the Bytes clone is the duplication step
    if eligible && response_parts.status == StatusCode::OK {
        if let Some(store) = &state.store {
            let bytes = match axum::body::to_bytes(Body::new(response_body), usize::MAX).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "Failed to read upstream response");
                    return (StatusCode::BAD_GATEWAY, "Upstream body read failed").into_response();
                }
            };
            response_parts.headers.remove(header::TRANSFER_ENCODING);

            let entry = CachedResponse {
                status: response_parts.status,
                headers: response_parts.headers.clone(),
                body: bytes.clone(),
            };
            let store = Arc::clone(store);
            let store_key = key;
            let store_request_id = request_id.to_string();
            tokio::spawn(async move {
                match store.store(store_key, entry).await {
                    Ok(()) => metrics::record_cache_event("store"),
                    Err(e) => {
                        tracing::warn!(request_id = %store_request_id, error = %e, "Cache store failed");
                    }
                }
            });

            return Response::from_parts(response_parts, Body::from(bytes));
        }
    }

    Response::from_parts(response_parts, Body::new(response_body))
}

fn cached_into_response(entry: CachedResponse) -> Response {
    let mut response = Response::new(Body::from(entry.body));
    *response.status_mut() = entry.status;
    *response.headers_mut() = entry.headers;
    response
}
