//! Free-form update options carried by `setValue`.

use serde_json::{Map, Value};

/// The full `setValue` payload, handed to element bindings as update metadata.
///
/// The core only reads `text`; any other field (origin markers, selection
/// hints and so on) is for the binding to interpret.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    fields: Map<String, Value>,
}

impl UpdateOptions {
    /// Wrap a payload object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The `text` field, if it is a string.
    pub fn text(&self) -> Option<&str> {
        self.fields.get("text").and_then(Value::as_str)
    }

    /// Get a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read a boolean field; absent or non-boolean is `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Borrow the whole payload.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Convert back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for UpdateOptions {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}
