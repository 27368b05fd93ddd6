//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → stderr/stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (id, sequence, subject, status) on every event
//! - Metrics are cheap (atomic increments) and exist for local diagnostics
//! - Without an installed recorder, metric calls are no-ops

pub mod logging;
pub mod metrics;
