//! Admission gate middleware.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;
use tracing::{debug, warn};

use super::client_ip::client_id;
use crate::ratelimit::AdmissionControl;

/// Body of every rate limited response.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Ask the limiter about each request before it reaches the inner service.
///
/// Denied requests get `429 Too Many Requests` with a plain-text body and
/// never reach the inner service. Allowed requests pass through untouched.
pub async fn rate_limit_middleware<R>(
    State(limiter): State<Arc<R>>,
    request: Request,
    next: Next,
) -> Response
where
    R: AdmissionControl + 'static,
{
    let client = client_id(&request);

    if !limiter.decide(&client) {
        warn!(client = %client, "Request blocked due to rate limit");
        return (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response();
    }

    debug!(client = %client, "Request allowed");
    next.run(request).await
}

/// Put every route of `router` behind the admission gate.
pub fn with_rate_limit<R, S>(router: Router<S>, limiter: Arc<R>) -> Router<S>
where
    R: AdmissionControl + 'static,
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        limiter,
        rate_limit_middleware::<R>,
    ))
}
