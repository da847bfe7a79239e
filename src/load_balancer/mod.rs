//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives at the dispatcher
//!     → round_robin.rs (claim next slot, probe target, skip if dead)
//!     → backend.rs (forward to the chosen backend)
//!     → Return response or error
//! ```
//!
//! # Design Decisions
//! - Target list is fixed at startup and read without locking
//! - Rotation cursor is a single atomic; no lock is held across probes
//! - A selection call probes at most one full cycle, then fails
//! - `Upstream` is the seam for alternative targets (tests use an in-memory one)

use std::fmt;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};

use crate::http::forward::ForwardError;

pub mod backend;
pub mod pool;
pub mod round_robin;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::HttpBackend;
pub use pool::{build_pool, PoolError};
pub use round_robin::{RoundRobin, SelectError, CURSOR_RESET_THRESHOLD};

/// A backend the balancer can route to.
#[async_trait]
pub trait Upstream: Send + Sync + fmt::Debug {
    /// Base address of the backend.
    fn address(&self) -> &str;

    /// Probe the backend once. Dead on transport error or 5xx.
    async fn is_alive(&self) -> bool;

    /// Relay a request to the backend and return its response.
    async fn serve(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError>;
}
