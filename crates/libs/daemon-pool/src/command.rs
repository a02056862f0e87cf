use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::{SystemTime, UNIX_EPOCH};

/// A method plus its positional parameters, before an id is attached.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RpcCall {
    pub method: String,
    #[serde(default)]
    pub params: Vec<JsonValue>,
}

impl RpcCall {
    pub fn new(method: impl Into<String>, params: Vec<JsonValue>) -> Self {
        Self { method: method.into(), params }
    }
}

impl<M: Into<String>> From<(M, Vec<JsonValue>)> for RpcCall {
    fn from((method, params): (M, Vec<JsonValue>)) -> Self {
        Self::new(method, params)
    }
}

/// JSON-RPC 1.0 request object as it goes on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<JsonValue>,
    pub id: u64,
}

impl RpcRequest {
    pub fn from_call(call: &RpcCall, ordinal: usize) -> Self {
        Self { method: call.method.clone(), params: call.params.clone(), id: request_id(ordinal) }
    }

    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Serializes `calls` as one JSON-RPC batch array with distinct ids.
pub fn build_batch_body(calls: &[RpcCall]) -> Result<Vec<u8>, serde_json::Error> {
    let base = request_id(0);
    let requests: Vec<RpcRequest> = calls
        .iter()
        .enumerate()
        .map(|(ordinal, call)| RpcRequest {
            method: call.method.clone(),
            params: call.params.clone(),
            id: base + ordinal as u64,
        })
        .collect();
    serde_json::to_vec(&requests)
}

/// Wall-clock milliseconds, plus jitter in `0..10`, plus `ordinal`.
///
/// Daemons only echo the id back; uniqueness per outstanding request on one
/// connection is all that matters.
pub fn request_id(ordinal: usize) -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);
    let jitter = u64::from(OsRng.next_u32() % 10);
    millis + jitter + ordinal as u64
}
