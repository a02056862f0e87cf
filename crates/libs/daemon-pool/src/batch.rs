use crate::command::{build_batch_body, RpcCall};
use crate::error::InstanceError;
use crate::parser;
use crate::pool::DaemonPool;
use serde_json::Value as JsonValue;

impl DaemonPool {
    /// Sends `calls` as one JSON-RPC batch to the first instance only.
    ///
    /// Batch semantics are per connection, so this path is never fanned out.
    /// Returns the decoded reply (normally an array of envelopes) unchanged.
    ///
    /// A daemon that rejects the whole batch answers with one envelope instead
    /// of an array. That becomes [`InstanceError::Rpc`] carrying the envelope's
    /// `error` member; the rest of such an envelope is a null `result` and an
    /// `id` that no call in the batch was sent with.
    pub async fn batch_cmd(&self, calls: &[RpcCall]) -> Result<JsonValue, InstanceError> {
        let instance = &self.instances()[0];
        let body = build_batch_body(calls).map_err(|err| InstanceError::request(err.to_string()))?;
        log::debug!("rpc({}): batch of {} calls", instance.index(), calls.len());

        let reply = self.transport().post(instance, &body).await?;
        if reply.is_unauthorized() {
            self.log_unauthorized(instance);
            return Err(InstanceError::Unauthorized {
                message: format!("invalid RPC username or password for {}", instance.endpoint()),
            });
        }

        let decoded = parser::parse_body(&reply.body).map_err(|failure| {
            self.log_decode_failure(instance, &body, &reply.body);
            InstanceError::Decode { message: failure.to_string() }
        })?;

        // a non-array reply is a single envelope rejecting the whole batch
        match decoded.get("error") {
            Some(error) if !error.is_null() => Err(InstanceError::Rpc { error: error.clone() }),
            _ => Ok(decoded),
        }
    }
}
