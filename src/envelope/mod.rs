//! Request/response envelopes exchanged over the message bus.
//!
//! # Data Flow
//! ```text
//! inbound message bytes
//!     → codec::decode_request → RequestEnvelope
//!     → (worker executes the HTTP call)
//!     → ResponseEnvelope → codec::encode_response
//!     → published to the reply subject
//! ```
//!
//! The `id` field is opaque: it is copied from request to response verbatim and
//! never inspected.

pub mod codec;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

pub use codec::{decode_request, encode_response, DecodeError};

/// Header name to values, in the order they were received.
pub type Headers = IndexMap<String, Vec<String>>;

/// Serialized description of one outbound HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestEnvelope {
    pub id: String,
    pub method: String,
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: Headers,
    /// Accepted on input but never applied to the outbound call.
    #[serde(deserialize_with = "null_as_default")]
    pub cookies: IndexMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

/// Explicit `null` reads as the empty value, the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serialized description of the HTTP response produced for a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResponseEnvelope {
    pub id: String,
    #[serde(rename = "workername")]
    pub worker_name: String,
    pub method: String,
    /// Human-readable status line, e.g. "200 OK".
    pub status: String,
    #[serde(rename = "statuscode")]
    pub status_code: u16,
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

impl ResponseEnvelope {
    /// Start a response correlated with `request`.
    pub fn for_request(request: &RequestEnvelope, worker_name: &str) -> Self {
        Self {
            id: request.id.clone(),
            worker_name: worker_name.to_string(),
            method: request.method.clone(),
            url: request.url.clone(),
            ..Default::default()
        }
    }
}
