//! Worker pool.
//!
//! # Data Flow
//! ```text
//! JobReceiver::next()
//!     → HttpExecutor::execute (shared client, runs to completion)
//!     → Ok:  encode ResponseEnvelope → publish to job.reply_to
//!     → Err: ErrorSink::report (no reply unless configured)
//!     → next job
//! ```
//!
//! # Design Decisions
//! - A fixed number of long-running tasks; no per-job spawning
//! - Jobs are never retried or re-enqueued
//! - In-flight jobs are not cancelled; the pool stops once the queue is
//!   closed and drained

mod identity;

use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;

use crate::envelope::{encode_response, ResponseEnvelope};
use crate::error::BridgeError;
use crate::executor::{failure_response, HttpExecutor};
use crate::observability::metrics;
use crate::queue::{Job, JobReceiver};
use crate::reporter::ErrorSink;
use crate::transport::MessageBus;

pub use identity::WorkerIdentity;

/// Read-only state shared by every worker.
pub struct WorkerContext {
    pub executor: HttpExecutor,
    pub bus: Arc<dyn MessageBus>,
    pub reporter: Arc<dyn ErrorSink>,
    pub identity: WorkerIdentity,
    /// Publish a 502 envelope to the caller when the HTTP call fails.
    pub reply_on_execution_error: bool,
}

impl WorkerContext {
    /// Run one job to completion. Failures go to the error reporter.
    pub async fn process(&self, job: Job) {
        let id = job.request.id.clone();
        match self.executor.execute(&job.request, self.identity.as_str()).await {
            Ok(response) => {
                tracing::info!(
                    sequence = job.sequence,
                    id = %id,
                    method = %response.method,
                    url = %response.url,
                    status = response.status_code,
                    "Request completed"
                );
                self.reply(&job, &response).await;
                metrics::record_job_completed("success");
            }
            Err(source) => {
                let failure = self
                    .reply_on_execution_error
                    .then(|| failure_response(&job.request, self.identity.as_str(), &source));
                self.reporter
                    .report(&BridgeError::Execution { id, source })
                    .await;
                if let Some(response) = failure {
                    self.reply(&job, &response).await;
                }
                metrics::record_job_completed("failure");
            }
        }
    }

    async fn reply(&self, job: &Job, response: &ResponseEnvelope) {
        let payload = match encode_response(response) {
            Ok(payload) => payload,
            Err(source) => {
                self.reporter
                    .report(&BridgeError::Encode {
                        id: response.id.clone(),
                        source,
                    })
                    .await;
                return;
            }
        };

        tracing::debug!(
            reply = %job.reply_to(),
            payload = %String::from_utf8_lossy(&payload),
            "Replying"
        );

        if let Err(source) = self.bus.publish(job.reply_to(), Bytes::from(payload)).await {
            self.reporter
                .report(&BridgeError::Publish {
                    id: response.id.clone(),
                    source,
                })
                .await;
        }
    }
}

/// Handles to the running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers draining `jobs`.
    pub fn spawn(count: usize, jobs: JobReceiver, context: Arc<WorkerContext>) -> Self {
        let handles = (0..count)
            .map(|worker| {
                let jobs = jobs.clone();
                let context = Arc::clone(&context);
                tokio::spawn(async move { run_worker(worker, jobs, context).await })
            })
            .collect();

        tracing::info!(workers = count, identity = %context.identity, "Worker pool started");
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit (queue closed and drained).
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}

async fn run_worker(worker: usize, jobs: JobReceiver, context: Arc<WorkerContext>) {
    let mut processed: u64 = 0;
    while let Some(job) = jobs.next().await {
        tracing::debug!(worker, sequence = job.sequence, id = %job.request.id, "Job claimed");
        context.process(job).await;
        processed += 1;
    }
    tracing::debug!(worker, processed, "Worker exiting");
}
