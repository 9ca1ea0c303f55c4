//! Timestamps, event ids and the JSON envelope printed by every command.

use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

pub const ENVELOPE_VERSION: &str = "1.0.0";

/// Unix-epoch seconds with a `Z` suffix, e.g. `1771220592Z`.
pub fn now_epoch_z() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

/// A fresh ULID; also used as the generation request id.
pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// `{envelope_version, ts, event_id, cmd, status}` merged with the fields
/// of `extra`. Non-object `extra` is ignored; envelope keys are never
/// overwritten.
pub fn command_envelope(cmd: &str, status: &str, extra: Value) -> Value {
    let mut envelope = json!({
        "envelope_version": ENVELOPE_VERSION,
        "ts": now_epoch_z(),
        "event_id": new_event_id(),
        "cmd": cmd,
        "status": status,
    });
    if let (Some(base), Value::Object(fields)) = (envelope.as_object_mut(), extra) {
        for (key, value) in fields {
            base.entry(key).or_insert(value);
        }
    }
    envelope
}
