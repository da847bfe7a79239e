//! Observability subsystem.
//!
//! All subsystems emit `tracing` events; `logging.rs` installs the subscriber
//! that renders them. Every dispatched request produces one `info` event
//! naming the chosen target.

pub mod logging;
