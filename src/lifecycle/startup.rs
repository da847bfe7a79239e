//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the backend pool from validated configuration
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when the pool is ready)

use std::sync::Arc;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::{Dispatcher, HttpServer};
use crate::lifecycle::Shutdown;
use crate::load_balancer::{build_pool, PoolError};
use crate::net::{self, ListenerError};

/// Fatal error while starting or running the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the balancer from `config` and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let pool = build_pool(&config)?;
    tracing::info!(
        backends = ?config.backend_addresses(),
        "Backend pool ready"
    );

    let dispatcher = Dispatcher::new(Arc::new(pool));
    let server = HttpServer::new(dispatcher, &config.timeouts);

    let listener = net::bind(&config.listener).await?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
