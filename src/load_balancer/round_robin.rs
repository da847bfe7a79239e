//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::load_balancer::Upstream;

/// Cursor values above this are folded back into `0..len`.
pub const CURSOR_RESET_THRESHOLD: usize = 1_000_000;

/// Failure to pick a target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("round-robin pool requires at least one target")]
    EmptyPool,

    #[error("all {attempts} targets failed their liveness probe")]
    AllTargetsUnavailable { attempts: usize },
}

/// Round-robin selector over a fixed, ordered target list.
///
/// Every probe attempt claims one cursor slot, so a call that skips `k` dead
/// targets advances the rotation by `k + 1`. Probes happen after the slot is
/// claimed; nothing is locked while a probe is in flight.
#[derive(Debug)]
pub struct RoundRobin {
    targets: Vec<Arc<dyn Upstream>>,
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new(targets: Vec<Arc<dyn Upstream>>) -> Result<Self, SelectError> {
        if targets.is_empty() {
            return Err(SelectError::EmptyPool);
        }
        Ok(Self {
            targets,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn targets(&self) -> &[Arc<dyn Upstream>] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always false; construction rejects an empty list.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Raw cursor value.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Atomically advance the cursor by `steps`, returning the value it held before.
    fn advance(&self, steps: usize) -> usize {
        let len = self.targets.len();
        let result = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = current.wrapping_add(steps);
                // Folding modulo len keeps the rotation position across the reset.
                Some(if next > CURSOR_RESET_THRESHOLD {
                    next % len
                } else {
                    next
                })
            });
        match result {
            Ok(previous) | Err(previous) => previous,
        }
    }

    /// Pick the next live target in rotation order.
    ///
    /// Each call claims a single start slot and scans one full cycle from
    /// there, so concurrent calls cannot push it back onto a target it has
    /// already seen dead. The skipped targets are added to the cursor once a
    /// live one is found. If none of them is alive the call fails with
    /// [`SelectError::AllTargetsUnavailable`].
    pub async fn next(&self) -> Result<Arc<dyn Upstream>, SelectError> {
        let len = self.targets.len();
        let start = self.advance(1);

        for skipped in 0..len {
            let target = &self.targets[start.wrapping_add(skipped) % len];

            if target.is_alive().await {
                if skipped > 0 {
                    self.advance(skipped);
                }
                return Ok(Arc::clone(target));
            }

            tracing::debug!(
                address = %target.address(),
                attempt = skipped + 1,
                "Target failed liveness probe, skipping"
            );
        }

        self.advance(len - 1);
        tracing::warn!(targets = len, "No live targets available");
        Err(SelectError::AllTargetsUnavailable { attempts: len })
    }
}
