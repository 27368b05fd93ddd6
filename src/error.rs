//! Non-fatal errors raised while bridging messages.
//!
//! None of these stop the bridge: each is handed to the error reporter and the
//! message or job that caused it is dropped.

use serde::Serialize;
use thiserror::Error;

use crate::envelope::DecodeError;
use crate::executor::ExecutionError;
use crate::transport::TransportError;

/// Category of a reported error, as it appears in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    MissingReply,
    Execution,
    Publish,
    Encode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::MissingReply => "missing_reply",
            ErrorKind::Execution => "execution",
            ErrorKind::Publish => "publish",
            ErrorKind::Encode => "encode",
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Inbound payload is not a request envelope. No job is created.
    #[error("message on '{subject}' rejected: {source}")]
    Decode {
        subject: String,
        #[source]
        source: DecodeError,
    },

    /// Inbound message carried no reply subject. No job is created.
    #[error("message on '{subject}' (id '{id}') has no reply subject")]
    MissingReply { subject: String, id: String },

    /// The HTTP call could not be completed.
    #[error("request '{id}' failed: {source}")]
    Execution {
        id: String,
        #[source]
        source: ExecutionError,
    },

    /// A response could not be published to its reply subject.
    #[error("failed to reply to request '{id}': {source}")]
    Publish {
        id: String,
        #[source]
        source: TransportError,
    },

    /// A response could not be serialized.
    #[error("failed to encode response for request '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Decode { .. } => ErrorKind::Decode,
            BridgeError::MissingReply { .. } => ErrorKind::MissingReply,
            BridgeError::Execution { .. } => ErrorKind::Execution,
            BridgeError::Publish { .. } => ErrorKind::Publish,
            BridgeError::Encode { .. } => ErrorKind::Encode,
        }
    }

    /// Id of the request involved, when the payload got far enough to have one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            BridgeError::Decode { .. } => None,
            BridgeError::MissingReply { id, .. }
            | BridgeError::Execution { id, .. }
            | BridgeError::Publish { id, .. }
            | BridgeError::Encode { id, .. } => Some(id),
        }
    }

    /// Subject the offending message arrived on, for dispatch-time errors.
    pub fn subject(&self) -> Option<&str> {
        match self {
            BridgeError::Decode { subject, .. } | BridgeError::MissingReply { subject, .. } => {
                Some(subject)
            }
            _ => None,
        }
    }
}
