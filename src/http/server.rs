//! HTTP server implementation.

use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::gate::with_rate_limit;
use crate::error::{Result, TurnstileError};
use crate::ratelimit::AdmissionControl;

/// HTTP server that puts a downstream router behind the admission gate.
pub struct HttpServer<R: AdmissionControl + 'static> {
    /// Address to bind to
    addr: SocketAddr,
    /// The admission policy consulted for every request
    limiter: Arc<R>,
    /// The protected routes
    downstream: Router,
}

impl<R: AdmissionControl + 'static> HttpServer<R> {
    /// Create a new HTTP server protecting the default handler.
    pub fn new(addr: SocketAddr, limiter: Arc<R>) -> Self {
        Self {
            addr,
            limiter,
            downstream: default_router(),
        }
    }

    /// Protect `downstream` instead of the default handler.
    pub fn with_downstream(mut self, downstream: Router) -> Self {
        self.downstream = downstream;
        self
    }

    /// Build the gated router.
    pub fn router(&self) -> Router {
        with_rate_limit(self.downstream.clone(), self.limiter.clone())
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            error!(addr = %self.addr, error = %e, "Failed to bind HTTP listener");
            TurnstileError::Io(e)
        })?;

        info!(
            addr = %listener.local_addr()?,
            "Starting HTTP server with rate limiting"
        );

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                TurnstileError::Io(e)
            })
    }
}

/// The stand-in downstream service.
fn default_router() -> Router {
    Router::new()
        .route("/", get(request_received))
        .fallback(request_received)
}

async fn request_received() -> &'static str {
    "Request received"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::RateLimiter;
    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::StatusCode;
    use std::time::Duration;
    use tower::ServiceExt;

    #[test]
    fn test_server_creation() {
        let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)).unwrap());
        let _server = HttpServer::new(addr, rate_limiter);
    }

    #[tokio::test]
    async fn test_default_router_answers_any_path() {
        let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)).unwrap());
        let app = HttpServer::new(addr, rate_limiter).router();

        let peer: SocketAddr = "203.0.113.7:443".parse().unwrap();
        let request = axum::http::Request::builder()
            .uri("/some/path")
            .extension(ConnectInfo(peer))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Request received");
    }

    #[tokio::test]
    async fn test_serve_fails_when_address_in_use() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)).unwrap());

        let result = HttpServer::new(addr, rate_limiter)
            .serve_with_shutdown(async {})
            .await;

        assert!(matches!(result, Err(TurnstileError::Io(_))));
    }

    #[tokio::test]
    async fn test_serve_with_shutdown_stops() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)).unwrap());

        let result = HttpServer::new(addr, rate_limiter)
            .serve_with_shutdown(async {})
            .await;

        assert!(result.is_ok());
    }
}
