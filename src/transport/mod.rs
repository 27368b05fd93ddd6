//! Message bus abstraction.
//!
//! The bridge only needs two operations from its transport: a queue-group
//! subscription delivering inbound messages, and fire-and-forget publish.
//! Connection management stays inside the concrete backends.
//!
//! ## Key components
//!
//! - [`MessageBus`]: trait implemented by concrete backends
//! - [`InboundMessage`]: one delivered message with its reply subject
//! - [`NatsBus`]: backend over an `async_nats::Client`
//! - [`MemoryBus`]: in-process backend for tests and local pipelines

pub mod memory;
pub mod nats;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub use memory::MemoryBus;
pub use nats::NatsBus;

/// Stream of messages delivered to one subscription.
pub type Inbox = BoxStream<'static, InboundMessage>;

/// A message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Subject the message was published on.
    pub subject: String,
    /// Transport-supplied reply destination, if the publisher asked for one.
    pub reply: Option<String>,
    pub payload: Bytes,
}

impl InboundMessage {
    pub fn new(subject: impl Into<String>, reply: Option<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            reply,
            payload: payload.into(),
        }
    }
}

/// Errors returned by transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {servers}: {source}")]
    Connect {
        servers: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to subscribe to '{subject}' (queue group '{queue_group}'): {source}")]
    Subscribe {
        subject: String,
        queue_group: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to publish to '{subject}': {source}")]
    Publish {
        subject: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("publish to '{subject}' timed out after {timeout_ms}ms")]
    PublishTimeout { subject: String, timeout_ms: u64 },
}

/// Publish/subscribe handle used by the dispatcher, workers and error reporter.
///
/// Implementations must be safe to share between all workers.
#[async_trait::async_trait]
pub trait MessageBus: Send + Sync {
    /// Join `queue_group` on `subject`. Each message published on the subject is
    /// delivered to one member of the group.
    async fn subscribe(&self, subject: &str, queue_group: &str) -> Result<Inbox, TransportError>;

    /// Publish `payload` on `subject`.
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError>;
}
