//! Liveness probing.
//!
//! # Responsibilities
//! - Issue a GET to a backend and classify the result
//! - Enforce the configured probe deadline
//!
//! A probe is alive when it completes with a status below 500. Transport
//! errors, timeouts and 5xx responses all count as dead.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::config::{HealthCheckConfig, TimeoutConfig, UpstreamConfig};

/// Result of one liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Completed with a status below 500.
    Alive(StatusCode),
    /// Completed with a 5xx status.
    ServerError(StatusCode),
    /// Transport failure or timeout.
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_alive(&self) -> bool {
        matches!(self, ProbeOutcome::Alive(_))
    }

    /// Classify a completed response status.
    pub fn from_status(status: StatusCode) -> Self {
        if status.as_u16() >= 500 {
            ProbeOutcome::ServerError(status)
        } else {
            ProbeOutcome::Alive(status)
        }
    }
}

/// Issues liveness probes. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    path: Option<String>,
}

impl Prober {
    /// Build a prober from configuration.
    ///
    /// Redirects are followed the way a plain GET would follow them.
    pub fn new(
        health: &HealthCheckConfig,
        timeouts: &TimeoutConfig,
        upstream: &UpstreamConfig,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .user_agent("roundrobin-proxy-probe")
            .danger_accept_invalid_certs(upstream.accept_invalid_certs);

        if timeouts.connect_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(timeouts.connect_secs));
        }
        if timeouts.probe_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeouts.probe_secs));
        }

        Ok(Self {
            client: builder.build()?,
            path: health.path.clone(),
        })
    }

    /// URL probed for a backend with the given base address.
    pub fn probe_url(&self, base: &Url) -> Url {
        match &self.path {
            Some(path) => {
                let mut url = base.clone();
                url.set_path(&join_paths(base.path(), path));
                url
            }
            None => base.clone(),
        }
    }

    /// Probe a backend once.
    pub async fn probe(&self, base: &Url) -> ProbeOutcome {
        let url = self.probe_url(base);
        let outcome = match self.client.get(url.clone()).send().await {
            Ok(response) => ProbeOutcome::from_status(response.status()),
            Err(e) if e.is_timeout() => ProbeOutcome::Unreachable("timed out".to_string()),
            Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        };

        match &outcome {
            ProbeOutcome::Alive(status) => {
                tracing::trace!(url = %url, status = %status, "Probe succeeded");
            }
            ProbeOutcome::ServerError(status) => {
                tracing::debug!(url = %url, status = %status, "Probe failed: server error");
            }
            ProbeOutcome::Unreachable(reason) => {
                tracing::debug!(url = %url, error = %reason, "Probe failed: unreachable");
            }
        }
        outcome
    }
}

/// Join two URL paths with exactly one slash between them.
pub(crate) fn join_paths(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}
