//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single HTTP(S) backend server
//! - Probe liveness on demand
//! - Relay requests through the shared forwarder

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use thiserror::Error;
use url::Url;

use crate::health::Prober;
use crate::http::forward::{ForwardError, Forwarder};
use crate::load_balancer::Upstream;

/// Error building a backend from its configured address.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme in backend address '{0}'")]
    UnsupportedScheme(String),

    #[error("backend address '{0}' has no host")]
    MissingHost(String),
}

/// A single backend server reached over HTTP or HTTPS.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Address as configured.
    address: String,
    /// Parsed base URL.
    base_url: Url,
    prober: Prober,
    forwarder: Forwarder,
}

impl HttpBackend {
    /// Create a backend from its base address.
    pub fn new(address: &str, prober: Prober, forwarder: Forwarder) -> Result<Self, BackendError> {
        let base_url = Url::parse(address).map_err(|source| BackendError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::UnsupportedScheme(address.to_string()));
        }
        if base_url.host_str().is_none() {
            return Err(BackendError::MissingHost(address.to_string()));
        }

        Ok(Self {
            address: address.to_string(),
            base_url,
            prober,
            forwarder,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Upstream for HttpBackend {
    fn address(&self) -> &str {
        &self.address
    }

    async fn is_alive(&self) -> bool {
        self.prober.probe(&self.base_url).await.is_alive()
    }

    async fn serve(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        self.forwarder.forward(&self.base_url, request).await
    }
}
