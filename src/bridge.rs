//! Bridge builder and dispatch loop.
//!
//! The [`BridgeBuilder`] configures the correlation uuid, the page origin and
//! the channel capacity. [`BridgeBuilder::start`] manages the lifecycle:
//! 1. Create the page channel
//! 2. Set up the handler (load, then bind change events)
//! 3. Post `ready`
//! 4. Dispatch inbound envelopes one at a time until the channel closes
//!
//! # Example
//!
//! ```ignore
//! use injector_bridge::Bridge;
//!
//! let (bridge, mut link) = Bridge::builder()
//!     .origin("https://example.com")
//!     .start(element)
//!     .await?;
//!
//! link.send_envelope("getValue", bridge.uuid(), serde_json::json!({})).await?;
//! while let Some(envelope) = link.recv().await {
//!     // ready, value, change ...
//! }
//! ```

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::Result;
use crate::handler::{ElementBinding, Handler};
use crate::transport::{page_channel, InjectorLink};

/// Default page origin, as reported by opaque-origin documents.
pub const DEFAULT_ORIGIN: &str = "null";

/// Default capacity of each channel direction.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for a bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Correlation id; a random v4 uuid when unset.
    pub uuid: Option<String>,
    /// The page's own origin. Outbound envelopes are restricted to it.
    pub origin: String,
    /// Capacity of each channel direction (minimum 1).
    pub channel_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            uuid: None,
            origin: DEFAULT_ORIGIN.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Builder for configuring and starting a bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeBuilder {
    config: BridgeConfig,
}

impl BridgeBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed correlation id instead of a random one.
    pub fn uuid(mut self, uuid: impl Into<String>) -> Self {
        self.config.uuid = Some(uuid.into());
        self
    }

    /// Set the page origin.
    ///
    /// Default: `"null"`
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config.origin = origin.into();
        self
    }

    /// Set the capacity of each channel direction.
    ///
    /// Default: 1024
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Bind `element`, announce readiness and start dispatching.
    ///
    /// Returns the running bridge and the injector end of its channel. The
    /// `ready` envelope is already queued on the link when this returns.
    pub async fn start<E: ElementBinding>(self, element: E) -> Result<(Bridge, InjectorLink)> {
        let BridgeConfig {
            uuid,
            origin,
            channel_capacity,
        } = self.config;

        let uuid = uuid.unwrap_or_else(|| Uuid::new_v4().to_string());
        let (page, link) = page_channel(&origin, channel_capacity.max(1));

        let mut handler = Handler::new(element, uuid.clone(), page.port);
        handler.setup().await?;
        handler.post_ready()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            Bridge::dispatch_loop(handler, page.inbound).await;
            let _ = shutdown_tx.send(());
        });

        tracing::debug!("Bridge {} started on origin {}", uuid, origin);

        Ok((
            Bridge {
                uuid,
                shutdown_rx,
                _task: task,
            },
            link,
        ))
    }
}

/// A running bridge.
///
/// Use `wait_for_shutdown()` to block until the injector side goes away.
pub struct Bridge {
    /// Correlation id of the bound handler.
    uuid: String,
    /// Fires when the dispatch loop ends.
    shutdown_rx: oneshot::Receiver<()>,
    /// Dispatch task handle.
    _task: JoinHandle<()>,
}

impl Bridge {
    /// Create a new bridge builder.
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Correlation id the injector must put in every envelope.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Feed each inbound value through the handler.
    ///
    /// Dispatch failures are logged and do not stop the loop.
    async fn dispatch_loop<E: ElementBinding>(
        mut handler: Handler<E>,
        mut inbound: mpsc::Receiver<Value>,
    ) {
        while let Some(value) = inbound.recv().await {
            if let Err(e) = handler.handle_message(&value) {
                tracing::error!("Dispatch error for handler {}: {}", handler.uuid(), e);
            }
        }
        tracing::debug!("Inbound channel closed for handler {}", handler.uuid());
    }

    /// Wait until the inbound side of the channel is closed.
    ///
    /// This consumes the bridge.
    pub async fn wait_for_shutdown(self) -> Result<()> {
        let _ = self.shutdown_rx.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = BridgeBuilder::new();
        let config = builder.config();

        assert!(config.uuid.is_none());
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = Bridge::builder()
            .uuid("fixed")
            .origin("https://example.com")
            .channel_capacity(8);

        let config = builder.config();
        assert_eq!(config.uuid.as_deref(), Some("fixed"));
        assert_eq!(config.origin, "https://example.com");
        assert_eq!(config.channel_capacity, 8);
    }
}
