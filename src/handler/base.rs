//! The page-side handler.
//!
//! A [`Handler`] owns one bound element and the uuid the injector uses to
//! address it. Many handlers can share one page channel; each one ignores
//! envelopes carrying another uuid.
//!
//! # Example
//!
//! ```ignore
//! use injector_bridge::handler::Handler;
//! use injector_bridge::transport::page_channel;
//!
//! let (page, mut link) = page_channel("https://example.com", 64);
//! let mut handler = Handler::new(element, "3f2c", page.port);
//! handler.setup().await?;
//! handler.post_ready()?;
//!
//! handler.handle_message(&serde_json::json!({
//!     "type": "getValue",
//!     "uuid": "3f2c",
//!     "payload": {}
//! }))?;
//! let reply = link.recv().await; // { type: "value", payload: { text } }
//! ```

use serde_json::{Map, Value};

use super::{ChangeCallback, ElementBinding, Silencer};
use crate::error::{BridgeError, Result};
use crate::protocol::{
    InboundEnvelope, MessageKind, OutboundEnvelope, OutboundKind, UpdateOptions,
};
use crate::transport::PagePort;

/// Dispatch routine for one inbound kind.
type Route<E> = fn(&mut Handler<E>, Value) -> Result<()>;

/// Handler binding one element to the injector protocol.
pub struct Handler<E> {
    /// The bound element (exclusively owned).
    element: E,
    /// Correlation id.
    uuid: String,
    /// Outbound half of the page channel.
    port: PagePort,
    /// Silencing state shared with the change callback.
    silencer: Silencer,
    /// Set once `bind_change` succeeded.
    bound: bool,
}

impl<E: ElementBinding> Handler<E> {
    /// Create a handler. Nothing is validated or bound yet.
    pub fn new(element: E, uuid: impl Into<String>, port: PagePort) -> Self {
        Self {
            element,
            uuid: uuid.into(),
            port,
            silencer: Silencer::new(),
            bound: false,
        }
    }

    /// Correlation id.
    #[inline]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Borrow the bound element.
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Mutably borrow the bound element.
    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// The handler's silencing state.
    pub fn silencer(&self) -> &Silencer {
        &self.silencer
    }

    /// Whether change notifications are currently suppressed.
    #[inline]
    pub fn is_silenced(&self) -> bool {
        self.silencer.is_silenced()
    }

    /// Whether `setup()` has completed.
    #[inline]
    pub fn is_set_up(&self) -> bool {
        self.bound
    }

    /// Load the element, then subscribe to its change signal.
    ///
    /// Change notifications cannot fire before `load` has resolved. A second
    /// call fails with [`BridgeError::AlreadySetUp`].
    pub async fn setup(&mut self) -> Result<()> {
        if self.bound {
            return Err(BridgeError::AlreadySetUp);
        }

        self.element.load().await?;

        let port = self.port.clone();
        let uuid = self.uuid.clone();
        let on_change = self.wrap_silence(move || {
            let envelope = OutboundEnvelope::new(OutboundKind::Change.as_wire(), &uuid, None);
            if let Err(e) = port.post(envelope) {
                tracing::warn!("Failed to post change for {}: {}", uuid, e);
            }
        });
        self.element.bind_change(on_change)?;
        self.bound = true;

        tracing::debug!("Handler {} set up", self.uuid);
        Ok(())
    }

    /// Dispatch a raw inbound value.
    ///
    /// Values without a `type`, addressed to another uuid, or of an unknown
    /// kind are ignored. Errors from the kind's routine are returned as-is.
    pub fn handle_message(&mut self, data: &Value) -> Result<()> {
        self.handle_envelope(InboundEnvelope::from_value(data))
    }

    /// Dispatch a parsed inbound envelope.
    pub fn handle_envelope(&mut self, envelope: InboundEnvelope) -> Result<()> {
        let Some(name) = envelope.kind_name() else {
            tracing::trace!("Ignoring envelope without type");
            return Ok(());
        };

        if !envelope.is_for(&self.uuid) {
            tracing::trace!("Ignoring {} for {:?}", name, envelope.uuid);
            return Ok(());
        }

        let Some(kind) = MessageKind::from_wire(name) else {
            tracing::debug!("Ignoring unknown message kind {}", name);
            return Ok(());
        };

        let route = Self::route(kind);
        route(self, envelope.payload)
    }

    fn route(kind: MessageKind) -> Route<E> {
        match kind {
            MessageKind::GetValue => Self::route_get_value,
            MessageKind::SetValue => Self::on_set_value,
        }
    }

    fn route_get_value(&mut self, _payload: Value) -> Result<()> {
        self.on_get_value()
    }

    /// Answer `getValue` with a `value` envelope carrying `{ text }`.
    pub fn on_get_value(&self) -> Result<()> {
        let text = self.element.get_value()?;

        let mut payload = Map::with_capacity(1);
        payload.insert("text".to_string(), Value::String(text));
        self.post_to_injector(OutboundKind::Value.as_wire(), Some(payload))
    }

    /// Forward `setValue` to the element. Posts nothing itself.
    ///
    /// The payload is not validated here: `text` is passed on when it is a
    /// string, and a non-object payload becomes empty options. Whether that
    /// is a valid update is up to the element.
    pub fn on_set_value(&mut self, payload: Value) -> Result<()> {
        let options = match payload {
            Value::Object(fields) => UpdateOptions::new(fields),
            _ => UpdateOptions::default(),
        };

        self.element.set_value(options.text(), &options, &self.silencer)
    }

    /// Run `f` with change notifications suppressed.
    pub fn execute_silenced<R>(&self, f: impl FnOnce() -> R) -> R {
        self.silencer.execute_silenced(f)
    }

    /// Wrap `f` so that it only runs while unsilenced.
    pub fn wrap_silence<F>(&self, f: F) -> ChangeCallback
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.silencer.wrap(f)
    }

    /// Announce readiness, with the element's capability descriptor if any.
    pub fn post_ready(&self) -> Result<()> {
        let mut payload = Map::new();
        if let Some(extension) = self.element.extension().filter(|v| !v.is_null()) {
            payload.insert("extension".to_string(), extension);
        }
        self.post_to_injector(OutboundKind::Ready.as_wire(), Some(payload))
    }

    /// Post `{type, uuid, payload}` to the injector on the page's own origin.
    pub fn post_to_injector(&self, kind: &str, payload: Option<Map<String, Value>>) -> Result<()> {
        self.port
            .post(OutboundEnvelope::new(kind, &self.uuid, payload))
    }
}

impl<E: ElementBinding + std::fmt::Debug> std::fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("element", &self.element)
            .field("uuid", &self.uuid)
            .field("silencer", &self.silencer)
            .field("bound", &self.bound)
            .finish()
    }
}
