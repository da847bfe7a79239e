//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → dispatch.rs (select target, log choice)
//!     → forward.rs (relay to backend, stream response back)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod forward;
pub mod server;

pub use dispatch::{DispatchError, Dispatcher};
pub use forward::{ForwardError, Forwarder};
pub use server::HttpServer;
