//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the worker identity
//! - Build the shared HTTP client
//! - Connect the transport and join the queue group
//!
//! Every failure here is a [`StartupError`] and terminates the process.

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::config::{BridgeConfig, ConfigError};
use crate::transport::{NatsBus, TransportError};
use crate::worker::WorkerIdentity;

/// Fatal error while starting the bridge, or a bridge task that died.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("can't get system hostname: {0}")]
    Identity(#[source] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("bridge task failed: {0}")]
    Task(#[from] JoinError),
}

/// Resolve the identity stamped on responses.
pub fn resolve_identity(config: &BridgeConfig) -> Result<WorkerIdentity, StartupError> {
    WorkerIdentity::resolve(config.workers.worker_name.as_deref()).map_err(StartupError::Identity)
}

/// Connect to the configured NATS servers.
pub async fn connect_transport(config: &BridgeConfig) -> Result<NatsBus, StartupError> {
    let bus = NatsBus::connect(&config.transport.servers, &config.transport.connection_name).await?;
    Ok(bus)
}

/// Wait for the spawned bridge task. A panic or cancellation is an error.
pub async fn join_bridge(
    handle: &mut JoinHandle<Result<(), StartupError>>,
) -> Result<(), StartupError> {
    handle.await?
}
