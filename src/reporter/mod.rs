//! Error side channel.
//!
//! # Data Flow
//! ```text
//! dispatcher / worker
//!     → ErrorSink::report(&BridgeError)
//!     → log + metric
//!     → ErrorReport (JSON) published to the error subject
//! ```
//!
//! # Design Decisions
//! - Reporting never fails the caller: publish errors are only logged
//! - Each publication is bounded by a timeout so a stalled transport cannot
//!   hold a worker indefinitely
//! - No retries

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use crate::error::{BridgeError, ErrorKind};
use crate::observability::metrics;
use crate::transport::{MessageBus, TransportError};
use crate::worker::WorkerIdentity;

/// One-way sink for non-fatal errors.
#[async_trait::async_trait]
pub trait ErrorSink: Send + Sync {
    async fn report(&self, error: &BridgeError);
}

/// Payload published on the error subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub id: Option<String>,
    #[serde(rename = "workername")]
    pub worker_name: String,
    pub subject: Option<String>,
    pub message: String,
}

impl ErrorReport {
    pub fn new(error: &BridgeError, worker_name: &str) -> Self {
        Self {
            kind: error.kind(),
            id: error.request_id().map(str::to_string),
            worker_name: worker_name.to_string(),
            subject: error.subject().map(str::to_string),
            message: display_chain(error),
        }
    }
}

/// `Display` of `error` followed by each cause not already part of it,
/// joined with `": "`.
pub fn display_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Publishes error reports on a fixed subject of the message bus.
pub struct BusErrorReporter {
    bus: Arc<dyn MessageBus>,
    subject: String,
    identity: WorkerIdentity,
    publish_timeout: Duration,
}

impl BusErrorReporter {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        subject: impl Into<String>,
        identity: WorkerIdentity,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            bus,
            subject: subject.into(),
            identity,
            publish_timeout,
        }
    }

    async fn publish(&self, payload: Bytes) -> Result<(), TransportError> {
        match tokio::time::timeout(self.publish_timeout, self.bus.publish(&self.subject, payload)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::PublishTimeout {
                subject: self.subject.clone(),
                timeout_ms: self.publish_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait::async_trait]
impl ErrorSink for BusErrorReporter {
    async fn report(&self, error: &BridgeError) {
        tracing::error!(
            kind = error.kind().as_str(),
            id = error.request_id().unwrap_or("-"),
            error = %display_chain(error),
            "Reporting error"
        );
        metrics::record_error(error.kind());

        let report = ErrorReport::new(error, self.identity.as_str());
        let payload = match serde_json::to_vec(&report) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize error report");
                return;
            }
        };

        if let Err(e) = self.publish(Bytes::from(payload)).await {
            tracing::warn!(subject = %self.subject, error = %e, "Failed to publish error report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::decode_request;
    use crate::transport::MemoryBus;
    use serde_json::Value;

    fn decode_error() -> BridgeError {
        BridgeError::Decode {
            subject: "http".into(),
            source: decode_request(b"{not json").unwrap_err(),
        }
    }

    #[test]
    fn report_payload_shape() {
        let report = ErrorReport::new(&decode_error(), "host-a");
        let value: Value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["kind"], "decode");
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["workername"], "host-a");
        assert_eq!(value["subject"], "http");
        assert!(value["message"].as_str().unwrap().contains("invalid HTTP request envelope"));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct Opaque(#[source] Refused);

    #[test]
    fn message_includes_hidden_causes() {
        let error = BridgeError::Publish {
            id: "7".into(),
            source: TransportError::Publish {
                subject: "reply.7".into(),
                source: Box::new(Opaque(Refused)),
            },
        };

        let message = display_chain(&error);
        assert_eq!(
            message,
            "failed to reply to request '7': failed to publish to 'reply.7': error sending request: connection refused"
        );
        assert_eq!(ErrorReport::new(&error, "host-a").message, message);
    }

    #[tokio::test]
    async fn publishes_on_error_subject() {
        let bus = MemoryBus::new();
        let reporter = BusErrorReporter::new(
            Arc::new(bus.clone()),
            "error",
            WorkerIdentity::new("host-a"),
            Duration::from_secs(1),
        );

        reporter
            .report(&BridgeError::MissingReply {
                subject: "http".into(),
                id: "42".into(),
            })
            .await;

        let published = bus.published_on("error");
        assert_eq!(published.len(), 1);
        let value: Value = serde_json::from_slice(&published[0]).unwrap();
        assert_eq!(value["kind"], "missing_reply");
        assert_eq!(value["id"], "42");
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let bus = MemoryBus::new();
        bus.fail_publishes_to("error");
        let reporter = BusErrorReporter::new(
            Arc::new(bus.clone()),
            "error",
            WorkerIdentity::new("host-a"),
            Duration::from_secs(1),
        );

        reporter.report(&decode_error()).await;
        assert!(bus.published_on("error").is_empty());
    }

    struct StalledBus;

    #[async_trait::async_trait]
    impl MessageBus for StalledBus {
        async fn subscribe(
            &self,
            _subject: &str,
            _queue_group: &str,
        ) -> Result<crate::transport::Inbox, TransportError> {
            futures_util::future::pending().await
        }

        async fn publish(&self, _subject: &str, _payload: Bytes) -> Result<(), TransportError> {
            futures_util::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_transport_does_not_block_forever() {
        let reporter = BusErrorReporter::new(
            Arc::new(StalledBus),
            "error",
            WorkerIdentity::new("host-a"),
            Duration::from_millis(50),
        );

        tokio::time::timeout(Duration::from_secs(1), reporter.report(&decode_error()))
            .await
            .expect("report must give up after its publish timeout");
    }
}
