//! NATS backend.

use bytes::Bytes;
use futures_util::StreamExt;

use crate::transport::{Inbox, InboundMessage, MessageBus, TransportError};

/// [`MessageBus`] over a connected NATS client.
#[derive(Clone)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to the given servers. URLs may use the `nats://` or `tls://`
    /// scheme; the client fails over between them.
    pub async fn connect(servers: &[String], connection_name: &str) -> Result<Self, TransportError> {
        let joined = servers.join(",");
        let client = async_nats::ConnectOptions::new()
            .name(connection_name)
            .connect(joined.as_str())
            .await
            .map_err(|e| TransportError::Connect {
                servers: joined.clone(),
                source: Box::new(e),
            })?;

        tracing::info!(servers = %joined, "Connected to NATS");
        Ok(Self { client })
    }

    /// Wrap an already connected client.
    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Flush pending publications to the server.
    pub async fn flush(&self) -> Result<(), TransportError> {
        self.client.flush().await.map_err(|e| TransportError::Publish {
            subject: "<flush>".to_string(),
            source: Box::new(e),
        })
    }
}

#[async_trait::async_trait]
impl MessageBus for NatsBus {
    async fn subscribe(&self, subject: &str, queue_group: &str) -> Result<Inbox, TransportError> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| TransportError::Subscribe {
                subject: subject.to_string(),
                queue_group: queue_group.to_string(),
                source: Box::new(e),
            })?;

        let inbox = subscriber.map(|message| InboundMessage {
            subject: message.subject.to_string(),
            reply: message.reply.map(|reply| reply.to_string()),
            payload: message.payload,
        });
        Ok(inbox.boxed())
    }

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| TransportError::Publish {
                subject: subject.to_string(),
                source: Box::new(e),
            })
    }
}
