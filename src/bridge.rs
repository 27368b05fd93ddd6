//! Bridge assembly.
//!
//! # Responsibilities
//! - Build the shared HTTP executor and error reporter
//! - Create the bounded job queue
//! - Spawn the worker pool
//! - Subscribe and run the dispatcher until the subscription ends or
//!   shutdown is signalled, then drain the pool

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::BridgeConfig;
use crate::dispatcher::Dispatcher;
use crate::executor::HttpExecutor;
use crate::lifecycle::StartupError;
use crate::queue::JobQueue;
use crate::reporter::{BusErrorReporter, ErrorSink};
use crate::transport::MessageBus;
use crate::worker::{WorkerContext, WorkerIdentity, WorkerPool};

/// Message bus to HTTP bridge.
pub struct Bridge {
    config: BridgeConfig,
    bus: Arc<dyn MessageBus>,
    identity: WorkerIdentity,
    executor: HttpExecutor,
    reporter: Arc<dyn ErrorSink>,
}

impl Bridge {
    /// Create a bridge over `bus`. The HTTP client is built here and shared by
    /// every worker.
    pub fn new(
        config: BridgeConfig,
        bus: Arc<dyn MessageBus>,
        identity: WorkerIdentity,
    ) -> Result<Self, StartupError> {
        let executor = HttpExecutor::new(&config.http)?;
        let reporter: Arc<dyn ErrorSink> = Arc::new(BusErrorReporter::new(
            Arc::clone(&bus),
            config.transport.error_subject.clone(),
            identity.clone(),
            Duration::from_millis(config.reporting.publish_timeout_ms),
        ));

        Ok(Self {
            config,
            bus,
            identity,
            executor,
            reporter,
        })
    }

    /// Replace the error sink.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorSink>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    /// Subscribe and serve until the subscription ends or `shutdown` fires.
    ///
    /// Jobs already admitted to the queue are completed before returning.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let transport = &self.config.transport;
        let inbox = self.bus.subscribe(&transport.subject, &transport.queue_group).await?;
        tracing::info!(
            subject = %transport.subject,
            queue_group = %transport.queue_group,
            "Listening"
        );

        let (submitter, receiver) = JobQueue::bounded(self.config.workers.queue_capacity);
        let context = Arc::new(WorkerContext {
            executor: self.executor,
            bus: Arc::clone(&self.bus),
            reporter: Arc::clone(&self.reporter),
            identity: self.identity.clone(),
            reply_on_execution_error: self.config.workers.reply_on_execution_error,
        });
        let pool = WorkerPool::spawn(self.config.workers.count, receiver, context);

        let dispatcher = Dispatcher::new(submitter, Arc::clone(&self.reporter));
        let received = dispatcher.run(inbox, shutdown).await;

        tracing::info!(received, "Draining worker pool");
        pool.join().await;
        Ok(())
    }
}
