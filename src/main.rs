//! nats-http-bridge
//!
//! Executes HTTP requests received over NATS and replies with the responses.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────┐
//!                     │                    NATS HTTP BRIDGE                   │
//!   request subject   │  ┌────────────┐    ┌───────────┐    ┌──────────────┐  │
//!   (queue group)     │  │ dispatcher │───▶│ job queue │───▶│ worker pool  │  │
//!  ───────────────────┼─▶│  (decode)  │    │ (bounded) │    │ (W workers)  │──┼──▶ HTTP
//!                     │  └─────┬──────┘    └───────────┘    └──────┬───────┘  │    upstream
//!                     │        │                                   │          │
//!   reply subject     │        │          ┌──────────────┐         │          │
//!  ◀──────────────────┼────────┼──────────│   response   │◀────────┘          │
//!                     │        │          │  (encode)    │                    │
//!   "error" subject   │        ▼          └──────────────┘                    │
//!  ◀──────────────────┼── error reporter ◀── decode / execution / publish     │
//!                     └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use nats_http_bridge::config::{loader, validate_config, BridgeConfig, ConfigError};
use nats_http_bridge::lifecycle::{signals, startup, Shutdown, StartupError};
use nats_http_bridge::observability::{logging, metrics};
use nats_http_bridge::Bridge;

/// Use the tls:// scheme for TLS, e.g. `nats-http-bridge -s tls://demo.nats.io:4443 foo bar`.
#[derive(Parser, Debug)]
#[command(name = "nats-http-bridge", version)]
#[command(about = "Execute HTTP requests received over NATS and reply with the responses")]
struct Cli {
    /// NATS server URLs, separated by commas.
    #[arg(short = 's', long = "server", value_delimiter = ',')]
    servers: Vec<String>,

    /// Display timestamps in logs.
    #[arg(short = 't', long = "timestamps")]
    timestamps: bool,

    /// Optional TOML configuration file. Command-line values override it.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Number of concurrent workers.
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,

    /// Maximum number of jobs waiting for a worker.
    #[arg(long = "queue-capacity")]
    queue_capacity: Option<usize>,

    /// Subject receiving error reports.
    #[arg(long = "error-subject")]
    error_subject: Option<String>,

    /// Subject carrying HTTP request envelopes.
    subject: String,

    /// Queue group to join.
    queue_group: String,
}

impl Cli {
    fn into_config(self) -> Result<BridgeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => loader::read_config(path)?,
            None => BridgeConfig::default(),
        };

        if !self.servers.is_empty() {
            config.transport.servers = self.servers;
        }
        if self.timestamps {
            config.observability.show_timestamps = true;
        }
        if let Some(workers) = self.workers {
            config.workers.count = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.workers.queue_capacity = capacity;
        }
        if let Some(subject) = self.error_subject {
            config.transport.error_subject = subject;
        }
        config.transport.subject = self.subject;
        config.transport.queue_group = self.queue_group;

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("{}", StartupError::from(e));
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Bridge failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: BridgeConfig) -> Result<(), StartupError> {
    tracing::info!(
        servers = ?config.transport.servers,
        subject = %config.transport.subject,
        queue_group = %config.transport.queue_group,
        workers = config.workers.count,
        queue_capacity = config.workers.queue_capacity,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        if let Ok(addr) = addr.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let identity = startup::resolve_identity(&config)?;
    let bus = startup::connect_transport(&config).await?;

    let shutdown = Shutdown::new();
    let bridge = Bridge::new(config, Arc::new(bus.clone()), identity)?;
    let mut serving = tokio::spawn(bridge.run(shutdown.subscribe()));

    let result = tokio::select! {
        result = startup::join_bridge(&mut serving) => result,
        _ = signals::wait_for_termination() => {
            shutdown.trigger();
            startup::join_bridge(&mut serving).await
        }
    };

    if let Err(e) = bus.flush().await {
        tracing::warn!(error = %e, "Failed to flush pending publications");
    }
    result
}
