//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Message bus connection and subscription settings.
    pub transport: TransportConfig,

    /// Worker pool and job queue sizing.
    pub workers: WorkerConfig,

    /// Shared outbound HTTP client settings.
    pub http: HttpClientConfig,

    /// Error side channel settings.
    pub reporting: ReportingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Message bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Server URLs (e.g., "nats://127.0.0.1:4222", "tls://demo.nats.io:4443").
    pub servers: Vec<String>,

    /// Subject carrying serialized HTTP requests.
    pub subject: String,

    /// Queue group shared by all bridge processes serving the subject.
    pub queue_group: String,

    /// Subject receiving error reports.
    pub error_subject: String,

    /// Client name announced to the server.
    pub connection_name: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://127.0.0.1:4222".to_string()],
            subject: String::new(),
            queue_group: String::new(),
            error_subject: "error".to_string(),
            connection_name: "nats-http-bridge".to_string(),
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of concurrent workers draining the job queue.
    pub count: usize,

    /// Maximum number of admitted jobs waiting for a worker (backpressure).
    pub queue_capacity: usize,

    /// Identity stamped on responses. Defaults to the host name.
    pub worker_name: Option<String>,

    /// Publish a 502 response envelope to the caller when the HTTP call fails.
    /// Off by default: callers receive no reply on execution failure.
    pub reply_on_execution_error: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 1,
            queue_capacity: 8096,
            worker_name: None,
            reply_on_execution_error: false,
        }
    }
}

/// Outbound HTTP client configuration.
///
/// No timeout applies unless one is set here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// Total request timeout in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Maximum redirects followed before giving up.
    pub max_redirects: usize,

    /// Honour HTTP_PROXY / HTTPS_PROXY from the environment.
    pub use_system_proxy: bool,

    /// User-Agent sent when the request envelope does not carry one.
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            request_timeout_secs: None,
            max_redirects: 10,
            use_system_proxy: true,
            user_agent: None,
        }
    }
}

/// Error reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Upper bound on a single error publication, in milliseconds.
    pub publish_timeout_ms: u64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prefix log lines with timestamps.
    pub show_timestamps: bool,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_timestamps: false,
            metrics_address: None,
        }
    }
}
