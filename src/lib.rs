//! Message bus to HTTP bridge.
//!
//! Consumes serialized HTTP request envelopes from a queue-group subscription,
//! performs the described calls with a bounded pool of workers, and publishes
//! serialized response envelopes to each message's reply subject. Failures go
//! to a separate error subject.

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod observability;
pub mod queue;
pub mod reporter;
pub mod transport;
pub mod worker;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use error::BridgeError;
pub use lifecycle::Shutdown;
