//! Subscription callback: inbound message → at most one job.
//!
//! # Data Flow
//! ```text
//! InboundMessage
//!     → decode_request      (failure: report, drop)
//!     → reply subject check (missing: report, drop)
//!     → Job { request, reply_to }
//!     → JobSubmitter::submit (waits while the queue is full)
//! ```
//!
//! # Design Decisions
//! - Messages are handled one at a time, in delivery order
//! - Waiting on a full queue is the only backpressure: while the dispatcher
//!   waits it does not read further messages from the subscription
//! - No retries and no acknowledgements

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::broadcast;

use crate::envelope::decode_request;
use crate::error::BridgeError;
use crate::observability::metrics;
use crate::queue::{Job, JobSubmitter, QueueClosed};
use crate::reporter::ErrorSink;
use crate::transport::{Inbox, InboundMessage};

/// Turns inbound messages into jobs.
pub struct Dispatcher {
    jobs: JobSubmitter,
    reporter: Arc<dyn ErrorSink>,
    received: u64,
}

impl Dispatcher {
    pub fn new(jobs: JobSubmitter, reporter: Arc<dyn ErrorSink>) -> Self {
        Self {
            jobs,
            reporter,
            received: 0,
        }
    }

    /// Number of messages handled so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Handle one message. Returns `Err` only when the queue has closed and no
    /// further jobs can be admitted.
    pub async fn dispatch(&mut self, message: InboundMessage) -> Result<(), QueueClosed> {
        self.received += 1;
        let sequence = self.received;
        metrics::record_message_received();

        tracing::debug!(
            sequence,
            subject = %message.subject,
            reply = message.reply.as_deref().unwrap_or("-"),
            payload = %String::from_utf8_lossy(&message.payload),
            "Received message"
        );

        let request = match decode_request(&message.payload) {
            Ok(request) => request,
            Err(source) => {
                self.reporter
                    .report(&BridgeError::Decode {
                        subject: message.subject,
                        source,
                    })
                    .await;
                return Ok(());
            }
        };

        let id = request.id.clone();
        let Some(job) = Job::new(sequence, request, message.reply.unwrap_or_default()) else {
            self.reporter
                .report(&BridgeError::MissingReply {
                    subject: message.subject,
                    id,
                })
                .await;
            return Ok(());
        };

        self.jobs.submit(job).await?;
        metrics::record_job_enqueued();
        Ok(())
    }

    /// Dispatch messages from `inbox` until it ends, the queue closes, or
    /// shutdown is signalled. Dropping the dispatcher afterwards closes the
    /// queue.
    pub async fn run(mut self, mut inbox: Inbox, mut shutdown: broadcast::Receiver<()>) -> u64 {
        loop {
            tokio::select! {
                message = inbox.next() => {
                    let Some(message) = message else {
                        tracing::info!("Subscription ended");
                        break;
                    };
                    if let Err(e) = self.dispatch(message).await {
                        tracing::error!(error = %e, "Job queue closed, stopping dispatcher");
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Dispatcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
        self.received
    }
}
