//! Envelope types exchanged with the injector.
//!
//! Both directions use the same `{type, uuid, payload}` shape. Inbound
//! envelopes come from an untrusted page channel, so every field is
//! optional and parsing never fails hard: an envelope without a usable
//! `type` or `uuid` is simply not addressed to anyone.
//!
//! # Example
//!
//! ```
//! use injector_bridge::protocol::{InboundEnvelope, OutboundEnvelope};
//! use serde_json::json;
//!
//! let inbound = InboundEnvelope::from_value(&json!({
//!     "type": "getValue",
//!     "uuid": "a1",
//!     "payload": {}
//! }));
//! assert_eq!(inbound.kind_name(), Some("getValue"));
//!
//! let outbound = OutboundEnvelope::new("change", "a1", None);
//! assert_eq!(outbound.to_value()["payload"], json!({}));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// An envelope delivered to the page by the injector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundEnvelope {
    /// Message kind as sent on the wire (e.g. `"getValue"`).
    pub kind: Option<String>,
    /// Correlation id of the addressed handler.
    pub uuid: Option<String>,
    /// Kind-specific payload.
    pub payload: Value,
}

impl InboundEnvelope {
    /// Build an envelope from fields.
    pub fn new(kind: &str, uuid: &str, payload: Value) -> Self {
        Self {
            kind: Some(kind.to_string()),
            uuid: Some(uuid.to_string()),
            payload,
        }
    }

    /// Parse an arbitrary value leniently.
    ///
    /// Anything that is not an object, or whose `type`/`uuid` are not
    /// strings, yields an envelope with those fields unset.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            kind: obj.get("type").and_then(Value::as_str).map(str::to_string),
            uuid: obj.get("uuid").and_then(Value::as_str).map(str::to_string),
            payload: obj.get("payload").cloned().unwrap_or(Value::Null),
        }
    }

    /// The message kind, if present and non-empty.
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_deref().filter(|k| !k.is_empty())
    }

    /// Whether this envelope is addressed to `uuid`.
    #[inline]
    pub fn is_for(&self, uuid: &str) -> bool {
        self.uuid.as_deref() == Some(uuid)
    }
}

/// An envelope posted from the page to the injector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEnvelope {
    /// Message kind (e.g. `"value"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Correlation id of the sending handler.
    pub uuid: String,
    /// Payload object, `{}` when the sender had nothing to attach.
    pub payload: Map<String, Value>,
}

impl OutboundEnvelope {
    /// Create an outbound envelope; a missing payload becomes `{}`.
    pub fn new(kind: &str, uuid: &str, payload: Option<Map<String, Value>>) -> Self {
        Self {
            kind: kind.to_string(),
            uuid: uuid.to_string(),
            payload: payload.unwrap_or_default(),
        }
    }

    /// Convert to a JSON value.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::with_capacity(3);
        obj.insert("type".to_string(), Value::String(self.kind.clone()));
        obj.insert("uuid".to_string(), Value::String(self.uuid.clone()));
        obj.insert("payload".to_string(), Value::Object(self.payload.clone()));
        Value::Object(obj)
    }
}

/// Encode an outbound envelope as a single JSON line (no trailing newline).
pub fn encode_envelope(envelope: &OutboundEnvelope) -> Result<String> {
    Ok(serde_json::to_string(envelope)?)
}

/// Decode a JSON text into a raw value for inbound dispatch.
///
/// Only JSON syntax is checked here; envelope shape is checked at dispatch.
pub fn decode_envelope(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}
