//! Per-request dispatch.
//!
//! # Responsibilities
//! - Ask the selector for the next live target
//! - Record which target was chosen
//! - Forward the request and return the backend's response unchanged
//!
//! # Design Decisions
//! - No retries: a forward failure after selection goes straight back to the caller
//! - All targets dead maps to 503, forward failure to 502

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::http::forward::ForwardError;
use crate::load_balancer::{RoundRobin, SelectError};

const X_REQUEST_ID: &str = "x-request-id";

/// Per-request failure, rendered as an HTTP error response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no backend available: {0}")]
    AllTargetsUnavailable(#[source] SelectError),

    #[error("{0}")]
    Forward(#[from] ForwardError),
}

impl From<SelectError> for DispatchError {
    fn from(err: SelectError) -> Self {
        DispatchError::AllTargetsUnavailable(err)
    }
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::AllTargetsUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Entry point for every inbound request.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    selector: Arc<RoundRobin>,
}

impl Dispatcher {
    pub fn new(selector: Arc<RoundRobin>) -> Self {
        Self { selector }
    }

    /// Select a target and forward `request` to it.
    pub async fn handle(&self, request: Request<Body>) -> Result<Response<Body>, DispatchError> {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let target = match self.selector.next().await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejecting request");
                return Err(e.into());
            }
        };

        tracing::info!(
            request_id = %request_id,
            target = %target.address(),
            method = %request.method(),
            path = %request.uri().path(),
            "Forwarding request"
        );

        target.serve(request).await.map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                target = %target.address(),
                error = %e,
                "Upstream error"
            );
            DispatchError::Forward(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::mock::{targets, MockUpstream};

    fn dispatcher(mocks: &[Arc<MockUpstream>]) -> Dispatcher {
        Dispatcher::new(Arc::new(RoundRobin::new(targets(mocks)).unwrap()))
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn forwards_to_selected_target() {
        let mocks = vec![MockUpstream::new("A"), MockUpstream::new("B")];
        let dispatcher = dispatcher(&mocks);

        let first = dispatcher.handle(request()).await.unwrap();
        assert_eq!(body_text(first).await, "A");
        let second = dispatcher.handle(request()).await.unwrap();
        assert_eq!(body_text(second).await, "B");

        assert_eq!(mocks[0].served_count(), 1);
        assert_eq!(mocks[1].served_count(), 1);
    }

    #[tokio::test]
    async fn all_dead_is_service_unavailable() {
        let mocks = vec![MockUpstream::new("A"), MockUpstream::new("B")];
        for m in &mocks {
            m.set_alive(false);
        }

        let err = dispatcher(&mocks).handle(request()).await.unwrap_err();
        assert!(matches!(err, DispatchError::AllTargetsUnavailable(_)));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
