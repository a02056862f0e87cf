use crate::error::InstanceError;
use crate::instance::Instance;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Outcome of one dispatched command on one instance.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InstanceResult {
    pub error: Option<InstanceError>,
    /// The envelope's `result` member; `None` when absent or `null`.
    pub response: Option<JsonValue>,
    pub instance: Instance,
    /// Raw reply body, only present when the caller asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl InstanceResult {
    pub fn failed(instance: &Instance, error: InstanceError) -> Self {
        Self { error: Some(error), response: None, instance: instance.clone(), data: None }
    }

    /// Builds a result from a decoded `{result, error, id}` envelope.
    pub fn from_envelope(instance: &Instance, envelope: &JsonValue) -> Self {
        let error = non_null(envelope, "error").map(|error| InstanceError::Rpc { error });
        let response = non_null(envelope, "result");
        Self { error, response, instance: instance.clone(), data: None }
    }

    pub fn with_data(mut self, data: Option<String>) -> Self {
        self.data = data;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn non_null(envelope: &JsonValue, key: &str) -> Option<JsonValue> {
    envelope.get(key).filter(|value| !value.is_null()).cloned()
}
