//! Request identification middleware.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Preserve an ID already supplied by a trusted edge hop
//!
//! # Design Decisions
//! - The ID travels in `x-request-id`, both in logs and upstream

use axum::http::{HeaderValue, Request};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tower layer that stamps each request with an `x-request-id`.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Response;
    use std::convert::Infallible;

    #[tokio::test]
    async fn test_request_id_added_when_missing() {
        let mut service = RequestIdLayer.layer(tower::service_fn(|req: Request<Body>| async move {
            let id = req.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
            Ok::<_, Infallible>(Response::new(id))
        }));

        let response = service
            .call(Request::builder().body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(Uuid::parse_str(response.body()).is_ok());
    }

    #[tokio::test]
    async fn test_existing_request_id_preserved() {
        let mut service = RequestIdLayer.layer(tower::service_fn(|req: Request<Body>| async move {
            let id = req.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
            Ok::<_, Infallible>(Response::new(id))
        }));

        let request = Request::builder()
            .header(X_REQUEST_ID, "edge-supplied")
            .body(Body::empty())
            .unwrap();
        let response = service.call(request).await.unwrap();
        assert_eq!(response.body(), "edge-supplied");
    }
}
