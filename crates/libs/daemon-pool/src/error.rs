use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Per-instance failure carried inside an [`InstanceResult`](crate::InstanceResult).
///
/// Serialized with a `type` tag so log sinks and the CLI see the same shape the
/// daemons' operators are used to (`{"type":"offline","message":"..."}`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum InstanceError {
    /// The daemon actively refused the connection.
    #[error("offline: {message}")]
    #[serde(rename = "offline")]
    Offline { message: String },

    /// Any other network-level failure (DNS, reset, broken HTTP framing).
    #[error("request error: {message}")]
    #[serde(rename = "request error")]
    Request { message: String },

    /// HTTP 401 from the daemon.
    #[error("unauthorized: {message}")]
    #[serde(rename = "unauthorized")]
    Unauthorized { message: String },

    /// The body was neither JSON nor repairable into JSON.
    #[error("decode error: {message}")]
    #[serde(rename = "decode error")]
    Decode { message: String },

    /// The daemon answered with a non-null `error` member.
    #[error("rpc error: {error}")]
    #[serde(rename = "rpc error")]
    Rpc { error: JsonValue },
}

impl InstanceError {
    /// `true` when the failure happened below the JSON-RPC layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Offline { .. } | Self::Request { .. })
    }

    pub(crate) fn offline(message: impl Into<String>) -> Self {
        Self::Offline { message: message.into() }
    }

    pub(crate) fn request(message: impl Into<String>) -> Self {
        Self::Request { message: message.into() }
    }
}

/// Errors raised while building a pool or loading its configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    #[error("no daemon instances configured")]
    NoInstances,

    #[error("invalid pool config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read pool config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
