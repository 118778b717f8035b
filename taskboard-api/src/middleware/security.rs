/// Response hardening headers
///
/// Every response is JSON carrying user data or tokens, so each one is
/// marked as non-sniffable, non-frameable and non-cacheable. HSTS is added
/// only in production, where the server sits behind TLS.
///
/// ```no_run
/// use axum::Router;
/// use taskboard_api::middleware::security::SecurityHeadersLayer;
///
/// let app: Router = Router::new().layer(SecurityHeadersLayer::new(true));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Headers set on every response, overwriting whatever a handler set
const ALWAYS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

fn harden(headers: &mut HeaderMap, production: bool) {
    for (name, value) in ALWAYS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    // A handler's own caching policy wins
    headers
        .entry(header::CACHE_CONTROL)
        .or_insert(HeaderValue::from_static("no-store"));

    if production {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SecurityHeadersLayer {
    production: bool,
}

impl SecurityHeadersLayer {
    /// `production` turns on `Strict-Transport-Security`
    pub fn new(production: bool) -> Self {
        Self { production }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeaders {
            inner,
            production: self.production,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityHeaders<S> {
    inner: S,
    production: bool,
}

impl<S> Service<Request> for SecurityHeaders<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let response = self.inner.call(request);
        let production = self.production;

        Box::pin(async move {
            let mut response = response.await?;
            harden(response.headers_mut(), production);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn headers_for(app: Router) -> HeaderMap {
        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        response.headers().clone()
    }

    fn guarded(production: bool) -> Router {
        Router::new()
            .route("/ping", get(|| async { "ok" }))
            .layer(SecurityHeadersLayer::new(production))
    }

    #[tokio::test]
    async fn test_base_headers_applied() {
        let headers = headers_for(guarded(false)).await;

        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert_eq!(headers["cache-control"], "no-store");
        assert!(headers["content-security-policy"]
            .to_str()
            .unwrap()
            .starts_with("default-src 'none'"));
        assert!(headers.get("strict-transport-security").is_none());
    }

    #[tokio::test]
    async fn test_hsts_only_in_production() {
        let headers = headers_for(guarded(true)).await;
        assert_eq!(headers["strict-transport-security"], HSTS);
    }

    #[tokio::test]
    async fn test_handler_cache_policy_kept() {
        let app = Router::new()
            .route(
                "/ping",
                get(|| async { ([(header::CACHE_CONTROL, "max-age=60")], "ok") }),
            )
            .layer(SecurityHeadersLayer::new(false));

        let headers = headers_for(app).await;
        assert_eq!(headers["cache-control"], "max-age=60");
    }
}
