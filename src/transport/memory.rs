//! In-memory message bus for testing or local pipelines.
//!
//! Subjects match exactly (no wildcards). Each queue group receives one copy of
//! a message, handed to its members round robin. Every publication is also kept
//! in a log so tests can assert on what the bridge sent.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use tokio::sync::{mpsc, Notify};

use crate::transport::{Inbox, InboundMessage, MessageBus, TransportError};

struct Subscription {
    subject: String,
    queue_group: String,
    tx: mpsc::UnboundedSender<InboundMessage>,
}

#[derive(Default)]
struct Inner {
    subscriptions: Mutex<Vec<Subscription>>,
    published: Mutex<Vec<(String, Bytes)>>,
    failing_subjects: Mutex<HashSet<String>>,
    next_member: AtomicUsize,
    notify: Notify,
}

/// Shared in-process bus. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryBus {
    inner: Arc<Inner>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a message carrying a reply subject, as a requesting client would.
    pub fn publish_request(&self, subject: &str, reply: &str, payload: impl Into<Bytes>) {
        let message = InboundMessage::new(subject, Some(reply.to_string()), payload);
        self.record_and_deliver(message);
    }

    /// Number of live subscriptions on `subject`.
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.inner
            .subscriptions
            .lock()
            .expect("memory bus mutex poisoned")
            .iter()
            .filter(|s| s.subject == subject && !s.tx.is_closed())
            .count()
    }

    /// Make every later publish on `subject` fail.
    pub fn fail_publishes_to(&self, subject: &str) {
        self.inner
            .failing_subjects
            .lock()
            .expect("memory bus mutex poisoned")
            .insert(subject.to_string());
    }

    /// Payloads published on `subject` so far, in publication order.
    pub fn published_on(&self, subject: &str) -> Vec<Bytes> {
        self.inner
            .published
            .lock()
            .expect("memory bus mutex poisoned")
            .iter()
            .filter(|(s, _)| s == subject)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Wait until at least `count` payloads were published on `subject`, or
    /// `timeout` elapses. Returns whatever was published by then.
    pub async fn wait_for(&self, subject: &str, count: usize, timeout: Duration) -> Vec<Bytes> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.inner.notify.notified();
            let current = self.published_on(subject);
            if current.len() >= count {
                return current;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.published_on(subject);
            }
        }
    }

    fn record_and_deliver(&self, message: InboundMessage) {
        self.inner
            .published
            .lock()
            .expect("memory bus mutex poisoned")
            .push((message.subject.clone(), message.payload.clone()));

        {
            let mut subscriptions = self.inner.subscriptions.lock().expect("memory bus mutex poisoned");
            subscriptions.retain(|s| !s.tx.is_closed());

            let members: Vec<&Subscription> = subscriptions
                .iter()
                .filter(|s| s.subject == message.subject)
                .collect();
            let offset = self.inner.next_member.fetch_add(1, Ordering::Relaxed);

            let mut served_groups: HashSet<&str> = HashSet::new();
            for i in 0..members.len() {
                let member = members[(offset + i) % members.len()];
                if served_groups.insert(member.queue_group.as_str()) {
                    let _ = member.tx.send(message.clone());
                }
            }
        }

        self.inner.notify.notify_waiters();
    }
}

#[async_trait::async_trait]
impl MessageBus for MemoryBus {
    async fn subscribe(&self, subject: &str, queue_group: &str) -> Result<Inbox, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscriptions
            .lock()
            .expect("memory bus mutex poisoned")
            .push(Subscription {
                subject: subject.to_string(),
                queue_group: queue_group.to_string(),
                tx,
            });

        let inbox = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|message| (message, rx))
        });
        Ok(inbox.boxed())
    }

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError> {
        let failing = self
            .inner
            .failing_subjects
            .lock()
            .expect("memory bus mutex poisoned")
            .contains(subject);
        if failing {
            return Err(TransportError::Publish {
                subject: subject.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "publishing disabled on this subject",
                )),
            });
        }

        self.record_and_deliver(InboundMessage::new(subject, None, payload));
        Ok(())
    }
}
