//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured host:port
//!     → listener.rs (bind, report bound address)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bind failure is fatal at startup
//! - TLS termination is out of scope; the listener is plain TCP

pub mod listener;

pub use listener::{bind, ListenerError};
