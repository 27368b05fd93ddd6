//! Bounded FIFO job queue between the dispatcher and the worker pool.
//!
//! # Backpressure
//! ```text
//! dispatcher ── submit().await ──▶ [ capacity N ] ──▶ next().await ── workers
//!      ▲                                  │
//!      └──── blocks while the queue is full
//! ```
//! A full queue suspends the dispatcher, which stops pulling from its
//! subscription. Nothing is dropped and the buffer never grows past its
//! capacity.
//!
//! # Design Decisions
//! - Admission order is FIFO; completion order is not
//! - Workers share one receiver behind an async mutex, so each job is claimed
//!   exactly once
//! - Dropping every [`JobSubmitter`] closes the queue; workers drain what was
//!   admitted and then see `None`

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::envelope::RequestEnvelope;
use crate::observability::metrics;

/// One unit of work: a decoded request and where to send its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Position of the originating message in the dispatcher's stream.
    pub sequence: u64,
    pub request: RequestEnvelope,
    reply_to: String,
}

impl Job {
    /// Returns `None` when `reply_to` is empty.
    pub fn new(sequence: u64, request: RequestEnvelope, reply_to: String) -> Option<Self> {
        if reply_to.is_empty() {
            return None;
        }
        Some(Self {
            sequence,
            request,
            reply_to,
        })
    }

    /// Reply destination captured when the job was built.
    pub fn reply_to(&self) -> &str {
        &self.reply_to
    }
}

/// The queue was closed because every receiver is gone.
#[derive(Debug, Error)]
#[error("job queue closed")]
pub struct QueueClosed(pub Box<Job>);

/// Constructor for a connected submitter/receiver pair.
pub struct JobQueue;

impl JobQueue {
    /// Create a queue admitting at most `capacity` pending jobs.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn bounded(capacity: usize) -> (JobSubmitter, JobReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            JobSubmitter { tx },
            JobReceiver {
                rx: Arc::new(Mutex::new(rx)),
            },
        )
    }
}

/// Producer side of the queue.
#[derive(Debug, Clone)]
pub struct JobSubmitter {
    tx: mpsc::Sender<Job>,
}

impl JobSubmitter {
    /// Admit a job, waiting for a free slot while the queue is full.
    pub async fn submit(&self, job: Job) -> Result<(), QueueClosed> {
        self.tx
            .send(job)
            .await
            .map_err(|mpsc::error::SendError(job)| QueueClosed(Box::new(job)))?;
        metrics::record_queue_depth(self.depth());
        Ok(())
    }

    /// Number of admitted jobs not yet claimed by a worker.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer side of the queue, shared by all workers.
#[derive(Debug, Clone)]
pub struct JobReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobReceiver {
    /// Claim the next job, waiting while the queue is empty. Returns `None`
    /// once the queue is closed and drained.
    pub async fn next(&self) -> Option<Job> {
        let mut rx = self.rx.lock().await;
        let job = rx.recv().await;
        metrics::record_queue_depth(rx.len());
        job
    }
}
