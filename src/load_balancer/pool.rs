//! Backend pool construction.
//!
//! # Responsibilities
//! - Build the shared outbound clients once
//! - Turn each configured address into an `HttpBackend`
//! - Hand the ordered list to the round-robin selector

use std::sync::Arc;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::health::Prober;
use crate::http::forward::Forwarder;
use crate::load_balancer::{
    backend::{BackendError, HttpBackend},
    round_robin::{RoundRobin, SelectError},
    Upstream,
};

/// Error building the backend pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to build outbound HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Build the shared prober used for every backend.
pub fn build_prober(config: &ProxyConfig) -> Result<Prober, PoolError> {
    Ok(Prober::new(
        &config.health_check,
        &config.timeouts,
        &config.upstream,
    )?)
}

/// Build the round-robin selector over every configured backend, in order.
pub fn build_pool(config: &ProxyConfig) -> Result<RoundRobin, PoolError> {
    let prober = build_prober(config)?;
    let forwarder = Forwarder::new(&config.timeouts, &config.upstream)?;

    let mut targets: Vec<Arc<dyn Upstream>> = Vec::with_capacity(config.backends.len());
    for backend in &config.backends {
        let upstream = HttpBackend::new(&backend.address, prober.clone(), forwarder.clone())?;
        tracing::debug!(address = %backend.address, "Backend registered");
        targets.push(Arc::new(upstream));
    }

    Ok(RoundRobin::new(targets)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn builds_in_configured_order() {
        let mut config = ProxyConfig::default();
        config.backends = vec![
            BackendConfig::new("http://10.0.0.1:9000"),
            BackendConfig::new("http://10.0.0.2:9000"),
            BackendConfig::new("https://10.0.0.3"),
        ];

        let pool = build_pool(&config).unwrap();
        let addresses: Vec<_> = pool.targets().iter().map(|t| t.address()).collect();
        assert_eq!(
            addresses,
            vec!["http://10.0.0.1:9000", "http://10.0.0.2:9000", "https://10.0.0.3"]
        );
    }

    #[test]
    fn empty_config_fails() {
        let err = build_pool(&ProxyConfig::default()).unwrap_err();
        assert!(matches!(err, PoolError::Select(SelectError::EmptyPool)));
    }

    #[test]
    fn bad_address_fails() {
        let mut config = ProxyConfig::default();
        config.backends = vec![BackendConfig::new("http://ok.local"), BackendConfig::new("nope")];
        let err = build_pool(&config).unwrap_err();
        assert!(matches!(err, PoolError::Backend(BackendError::InvalidAddress { .. })));
    }
}
