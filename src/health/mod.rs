//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Selector reaches a target
//!     → probe.rs (GET base address or configured path)
//!     → ProbeOutcome (alive / server error / unreachable)
//!     → Selector keeps or skips the target for this call
//! ```
//!
//! # Design Decisions
//! - Probes run on demand during selection; there is no background checker
//! - Results are not cached; every rotation pass re-probes
//! - 4xx still counts as alive, only 5xx and transport errors are dead

pub mod probe;
pub mod report;

pub use probe::{ProbeOutcome, Prober};
pub use report::{check_all, exit_status, ProbeReport};
