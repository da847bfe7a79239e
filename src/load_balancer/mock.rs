//! In-memory upstream for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tokio::sync::Notify;

use crate::http::forward::ForwardError;
use crate::load_balancer::Upstream;

/// Upstream whose liveness is toggled by the test and whose `serve`
/// answers with its own address.
#[derive(Debug)]
pub struct MockUpstream {
    address: String,
    alive: AtomicBool,
    held: AtomicBool,
    checking: Notify,
    release: Notify,
    checks: AtomicUsize,
    served: AtomicUsize,
}

impl MockUpstream {
    pub fn new(address: &str) -> Arc<Self> {
        Arc::new(Self {
            address: address.to_string(),
            alive: AtomicBool::new(true),
            held: AtomicBool::new(false),
            checking: Notify::new(),
            release: Notify::new(),
            checks: AtomicUsize::new(0),
            served: AtomicUsize::new(0),
        })
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    /// Make the next liveness check block until [`MockUpstream::release`].
    pub fn hold_next_check(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Resolves once a held liveness check has started.
    pub async fn check_started(&self) {
        self.checking.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn probe_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn served_count(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    fn address(&self) -> &str {
        &self.address
    }

    async fn is_alive(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.held.swap(false, Ordering::SeqCst) {
            self.checking.notify_one();
            self.release.notified().await;
        }
        self.alive.load(Ordering::SeqCst)
    }

    async fn serve(&self, _request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        self.served.fetch_add(1, Ordering::SeqCst);
        let mut response = Response::new(Body::from(self.address.clone()));
        *response.status_mut() = StatusCode::OK;
        Ok(response)
    }
}

/// Upcast a set of mocks into the selector's target list.
pub fn targets(mocks: &[Arc<MockUpstream>]) -> Vec<Arc<dyn Upstream>> {
    mocks
        .iter()
        .map(|m| m.clone() as Arc<dyn Upstream>)
        .collect()
}
