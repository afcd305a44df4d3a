//! Upstream fetch execution.
//!
//! # Responsibilities
//! - Perform the actual upstream HTTP call
//! - In follow mode, chase upstream redirects so the client only sees the
//!   final response
//!
//! # Design Decisions
//! - No retries and no extra deadline; failures propagate to the caller
//! - Manual mode returns 3xx responses untouched so `Location` can be
//!   rewritten by the response rewriter
//! - Follow mode replays the buffered body on 307/308 and downgrades to a
//!   bodyless GET on 303 (and 301/302 for non-GET methods), matching
//!   fetch-primitive convention

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

/// Redirect hops chased in follow mode before giving up.
const MAX_REDIRECT_HOPS: u32 = 10;

/// Error from the upstream call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("invalid upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

/// Thin wrapper over the HTTP client capability.
#[derive(Clone)]
pub struct FetchExecutor {
    client: Client<HttpConnector, Body>,
}

impl FetchExecutor {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }

    /// Issue exactly one request, redirects included in the response.
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response<Incoming>, FetchError> {
        Ok(self.client.request(request).await?)
    }

    /// Issue a request and transparently follow upstream redirects.
    ///
    /// `body` is the fully buffered request body, if any; buffering is what
    /// makes replay on 307/308 possible.
    pub async fn dispatch_following(
        &self,
        mut method: Method,
        mut uri: Uri,
        mut headers: HeaderMap,
        mut body: Option<Bytes>,
    ) -> Result<Response<Incoming>, FetchError> {
        for _ in 0..MAX_REDIRECT_HOPS {
            let request = build_request(&method, &uri, &headers, body.clone())?;
            let response = self.client.request(request).await?;

            if !is_redirect(response.status()) {
                return Ok(response);
            }
            let Some(next) = redirect_target(&uri, response.headers()) else {
                return Ok(response);
            };

            if downgrades_to_get(response.status(), &method) {
                method = Method::GET;
                body = None;
                headers.remove(header::CONTENT_LENGTH);
                headers.remove(header::CONTENT_TYPE);
            }
            if let Some(authority) = next.authority() {
                if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
                    headers.insert(header::HOST, host);
                }
            }
            tracing::debug!(from = %uri, to = %next, "Following upstream redirect");
            uri = next;
        }

        // hop budget exhausted; surface the last target as a plain request
        let request = build_request(&method, &uri, &headers, body)?;
        Ok(self.client.request(request).await?)
    }
}

impl Default for FetchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn build_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Option<Bytes>,
) -> Result<Request<Body>, FetchError> {
    let mut request = Request::builder()
        .method(method.clone())
        .uri(uri.clone())
        .body(match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        })?;
    *request.headers_mut() = headers.clone();
    Ok(request)
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn downgrades_to_get(status: StatusCode, method: &Method) -> bool {
    status == StatusCode::SEE_OTHER
        || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
            && !matches!(*method, Method::GET | Method::HEAD))
}

/// Resolve the `Location` of a redirect against the current request URI.
/// Returns `None` when the header is missing or unparseable.
fn redirect_target(current: &Uri, headers: &HeaderMap) -> Option<Uri> {
    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    // resolving against the current URI yields absolute-form, which the
    // client requires
    let base = Url::parse(&current.to_string()).ok()?;
    let resolved = base.join(location).ok()?;
    resolved.as_str().parse::<Uri>().ok()
}
