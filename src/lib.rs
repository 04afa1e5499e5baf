//! # injector-bridge
//!
//! Page-side half of the injector envelope protocol.
//!
//! A script running inside a foreign page binds one element to a
//! [`Handler`]. The controlling process (the *injector*) talks to it only
//! through `{type, uuid, payload}` envelopes on the page message channel.
//!
//! ## Protocol
//!
//! - **Inbound**: `getValue`, `setValue { text, ...options }`
//! - **Outbound**: `value { text }`, `change {}`, `ready { extension? }`
//!
//! Envelopes for another uuid, without a `type`, or of an unknown kind are
//! ignored. Programmatic writes are silenced so they are not echoed back as
//! `change`.
//!
//! ## Example
//!
//! ```ignore
//! use injector_bridge::Bridge;
//!
//! #[tokio::main]
//! async fn main() -> injector_bridge::Result<()> {
//!     let (bridge, mut link) = Bridge::builder()
//!         .origin("https://example.com")
//!         .start(MyTextarea::new())
//!         .await?;
//!
//!     link.send_envelope("getValue", bridge.uuid(), serde_json::json!({})).await?;
//!     let ready = link.recv().await;
//!     let value = link.recv().await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handler;
pub mod protocol;
pub mod transport;

mod bridge;

pub use bridge::{Bridge, BridgeBuilder, BridgeConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_ORIGIN};
pub use error::{BridgeError, Result};
pub use handler::{ChangeCallback, ElementBinding, Handler, Silencer};
