//! Upstream request construction.
//!
//! # Responsibilities
//! - Swap the request authority for the configured upstream
//! - Strip the reserved prefix when the upstream expects bare paths
//! - Attach forwarded-context headers (Host, X-Forwarded-*)
//!
//! # Design Decisions
//! - Classification guarantees the path starts with the prefix, so
//!   construction has no error states of its own
//! - A missing client-IP header yields an empty forwarded-for value,
//!   never a failure

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::uri::{Authority, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use bytes::Bytes;
use std::str::FromStr;

use crate::config::RouteConfig;

/// Methods forwarded without a body.
pub fn is_bodyless(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Path the upstream sees for a proxied request.
///
/// With stripping enabled the reserved prefix is removed; an empty result
/// becomes `/`. Without stripping the path is forwarded as-is.
pub fn upstream_path(path: &str, prefix: &str, strip: bool) -> String {
    if !strip {
        return path.to_string();
    }
    match path.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

/// Scheme of the original request as seen at the edge.
///
/// The platform's `X-Forwarded-Proto` wins when present; otherwise the
/// listener itself terminated the connection, which is plain HTTP here.
pub fn original_scheme(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http")
}

/// Public host of the original request: the `Host` header (or HTTP/2
/// authority), falling back to the configured public host.
pub fn original_host(uri: &Uri, headers: &HeaderMap, route: &RouteConfig) -> String {
    if let Some(authority) = uri.authority() {
        return authority.to_string();
    }
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| route.public_host.clone())
}

/// `scheme://host` origin the client addressed.
pub fn public_origin(scheme: &str, host: &str) -> String {
    format!("{}://{}", scheme, host)
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Build the header map sent upstream: all original headers, then the
/// forwarded-context overrides.
pub fn forward_headers(
    original: &HeaderMap,
    route: &RouteConfig,
    scheme: &str,
    public_host: &str,
) -> HeaderMap {
    let mut headers = original.clone();

    set_header(&mut headers, header::HOST, &route.upstream_authority);
    set_header(
        &mut headers,
        HeaderName::from_static("x-forwarded-proto"),
        scheme,
    );
    set_header(
        &mut headers,
        HeaderName::from_static("x-forwarded-host"),
        public_host,
    );

    let client_ip = HeaderName::from_str(&route.client_ip_header)
        .ok()
        .and_then(|name| original.get(&name).cloned())
        .unwrap_or_else(|| HeaderValue::from_static(""));
    if let Ok(name) = HeaderName::from_str(&route.forwarded_for_header) {
        headers.insert(name, client_ip);
    }

    headers
}

/// Assemble the outbound upstream request from the original request parts
/// and its (already buffered) body.
pub fn build_upstream_request(
    parts: &Parts,
    body: Option<Bytes>,
    route: &RouteConfig,
) -> Result<Request<Body>, axum::http::Error> {
    let path = upstream_path(parts.uri.path(), &route.reserved_prefix, route.strip_prefix);
    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(Authority::from_str(&route.upstream_authority)?);
    uri_parts.path_and_query = Some(path_and_query.parse()?);
    let uri = Uri::from_parts(uri_parts)?;

    let scheme = original_scheme(&parts.headers).to_string();
    let public_host = original_host(&parts.uri, &parts.headers, route);

    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .body(match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        })?;
    *request.headers_mut() = forward_headers(&parts.headers, route, &scheme, &public_host);

    Ok(request)
}
