//! One-shot liveness report over a backend list.
//!
//! Used by the `upstream-probe` binary: probe every backend once, in
//! configured order, and summarize the result as an exit status.

use serde::Serialize;
use url::Url;

use crate::health::probe::{ProbeOutcome, Prober};

/// At least one backend answered.
pub const EXIT_ALIVE: u8 = 0;
/// Configuration or output failure.
pub const EXIT_ERROR: u8 = 1;
/// Every backend failed its probe.
pub const EXIT_ALL_DEAD: u8 = 2;

/// Liveness of a single backend, as printed in the JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub address: String,
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    pub fn new(address: &str, outcome: &ProbeOutcome) -> Self {
        let (status, error) = match outcome {
            ProbeOutcome::Alive(s) | ProbeOutcome::ServerError(s) => (Some(s.as_u16()), None),
            ProbeOutcome::Unreachable(reason) => (None, Some(reason.clone())),
        };
        Self {
            address: address.to_string(),
            alive: outcome.is_alive(),
            status,
            error,
        }
    }
}

/// Probe each address once, sequentially.
///
/// An address that does not parse is reported as unreachable.
pub async fn check_all<'a, I>(prober: &Prober, addresses: I) -> Vec<ProbeReport>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut reports = Vec::new();
    for address in addresses {
        let outcome = match Url::parse(address) {
            Ok(url) => prober.probe(&url).await,
            Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        };
        tracing::debug!(address, alive = outcome.is_alive(), "Backend checked");
        reports.push(ProbeReport::new(address, &outcome));
    }
    reports
}

/// Process exit status for a finished report.
pub fn exit_status(reports: &[ProbeReport]) -> u8 {
    if reports.iter().any(|r| r.alive) {
        EXIT_ALIVE
    } else {
        EXIT_ALL_DEAD
    }
}
