//! JSON decoding of daemon replies, with a one-shot repair for `-nan`.
//!
//! Some daemons print non-finite floats (e.g. `"difficulty":-nan`) which is not
//! JSON. The repair rewrites the literal to `0` and decodes once more.

use serde_json::Value as JsonValue;

const NAN_MARKER: &str = ":-nan";

/// The reply body could not be decoded even after repair.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct DecodeFailure {
    pub reason: String,
    pub repaired: bool,
}

pub fn parse_body(raw: &[u8]) -> Result<JsonValue, DecodeFailure> {
    let first_err = match serde_json::from_slice::<JsonValue>(raw) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let text = String::from_utf8_lossy(raw);
    let Some(repaired) = repair_nan(&text) else {
        return Err(DecodeFailure { reason: first_err.to_string(), repaired: false });
    };
    serde_json::from_str::<JsonValue>(&repaired).map_err(|err| {
        DecodeFailure { reason: format!("{err} (after -nan repair)"), repaired: true }
    })
}

/// Returns the rewritten text, or `None` when no `:-nan` marker is present.
pub fn repair_nan(text: &str) -> Option<String> {
    if !text.contains(NAN_MARKER) {
        return None;
    }
    Some(text.replace(":-nan,", ":0,").replace(":-nan}", ":0}"))
}
