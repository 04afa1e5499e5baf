//! In-process page message channel.
//!
//! Models the page's `postMessage` channel as a pair of bounded mpsc
//! queues:
//!
//! ```text
//! InjectorLink::send ─► inbound queue  ─► PageSide::inbound ─► Handler::handle_message
//! Handler::post_*    ─► PagePort::post ─► outbound queue ─► InjectorLink::recv
//! ```
//!
//! Every outbound post carries a target origin. The injector end only
//! accepts posts targeted at its own origin, the same way a browser drops a
//! `postMessage` whose `targetOrigin` does not match the receiving window.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{BridgeError, Result};
use crate::protocol::OutboundEnvelope;

/// An outbound envelope together with the origin it is restricted to.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// Origin the envelope may be delivered to.
    pub target_origin: String,
    /// The envelope itself.
    pub envelope: OutboundEnvelope,
}

/// Outbound half held by handlers.
///
/// Cheap to clone; all clones feed the same queue.
#[derive(Debug, Clone)]
pub struct PagePort {
    /// Queue sender, `None` for a detached port.
    tx: Option<mpsc::Sender<PostedMessage>>,
    /// The page's own origin.
    origin: String,
}

impl PagePort {
    /// Create a port that accepts and discards every post.
    pub fn detached(origin: &str) -> Self {
        Self {
            tx: None,
            origin: origin.to_string(),
        }
    }

    /// The page's own origin.
    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Post an envelope restricted to the page's own origin.
    pub fn post(&self, envelope: OutboundEnvelope) -> Result<()> {
        let origin = self.origin.clone();
        self.post_to(envelope, origin)
    }

    /// Post an envelope restricted to an explicit origin.
    ///
    /// Never waits: a full queue is reported as [`BridgeError::Backpressure`].
    pub fn post_to(&self, envelope: OutboundEnvelope, target_origin: String) -> Result<()> {
        let tx = match &self.tx {
            Some(tx) => tx,
            None => return Ok(()),
        };

        tx.try_send(PostedMessage {
            target_origin,
            envelope,
        })
        .map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => BridgeError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => BridgeError::ChannelClosed,
        })
    }
}

/// Page end of the channel: outbound port plus inbound envelopes.
#[derive(Debug)]
pub struct PageSide {
    /// Outbound half.
    pub port: PagePort,
    /// Raw inbound values, not yet checked for envelope shape.
    pub inbound: mpsc::Receiver<Value>,
}

/// Injector end of the channel.
#[derive(Debug)]
pub struct InjectorLink {
    /// `None` once [`close_inbound`](Self::close_inbound) was called.
    inbound_tx: Option<mpsc::Sender<Value>>,
    outbound_rx: mpsc::Receiver<PostedMessage>,
    origin: String,
}

impl InjectorLink {
    /// Origin this link accepts posts for.
    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Deliver a raw value into the page.
    pub async fn send(&self, value: Value) -> Result<()> {
        let tx = self.inbound_tx.as_ref().ok_or(BridgeError::ChannelClosed)?;
        tx.send(value).await.map_err(|_| BridgeError::ChannelClosed)
    }

    /// Deliver a `{type, uuid, payload}` envelope into the page.
    pub async fn send_envelope(&self, kind: &str, uuid: &str, payload: Value) -> Result<()> {
        self.send(serde_json::json!({
            "type": kind,
            "uuid": uuid,
            "payload": payload,
        }))
        .await
    }

    /// A sender for inbound values, e.g. for a stdin forwarder.
    ///
    /// Returns `None` after [`close_inbound`](Self::close_inbound).
    pub fn inbound_sender(&self) -> Option<mpsc::Sender<Value>> {
        self.inbound_tx.clone()
    }

    /// Drop this link's inbound sender.
    ///
    /// The page stops receiving once every sender handed out by
    /// [`inbound_sender`](Self::inbound_sender) is dropped too, while
    /// outbound envelopes can still be received.
    pub fn close_inbound(&mut self) {
        self.inbound_tx = None;
    }

    /// Receive the next envelope posted to this link's origin.
    ///
    /// Returns `None` once every [`PagePort`] is dropped.
    pub async fn recv(&mut self) -> Option<OutboundEnvelope> {
        loop {
            let posted = self.outbound_rx.recv().await?;
            if let Some(envelope) = self.accept(posted) {
                return Some(envelope);
            }
        }
    }

    /// Receive an already queued envelope without waiting.
    pub fn try_recv(&mut self) -> Option<OutboundEnvelope> {
        while let Ok(posted) = self.outbound_rx.try_recv() {
            if let Some(envelope) = self.accept(posted) {
                return Some(envelope);
            }
        }
        None
    }

    fn accept(&self, posted: PostedMessage) -> Option<OutboundEnvelope> {
        if posted.target_origin != self.origin {
            tracing::warn!(
                "Dropping {} envelope targeted at {} (link origin {})",
                posted.envelope.kind,
                posted.target_origin,
                self.origin
            );
            return None;
        }
        Some(posted.envelope)
    }
}

/// Create a connected page/injector channel pair for `origin`.
pub fn page_channel(origin: &str, capacity: usize) -> (PageSide, InjectorLink) {
    let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
    let (outbound_tx, outbound_rx) = mpsc::channel(capacity);

    let page = PageSide {
        port: PagePort {
            tx: Some(outbound_tx),
            origin: origin.to_string(),
        },
        inbound: inbound_rx,
    };
    let link = InjectorLink {
        inbound_tx: Some(inbound_tx),
        outbound_rx,
        origin: origin.to_string(),
    };

    (page, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORIGIN: &str = "https://example.com";

    #[test]
    fn test_detached_port_accepts_posts() {
        let port = PagePort::detached(ORIGIN);
        assert_eq!(port.origin(), ORIGIN);
        assert!(port.post(OutboundEnvelope::new("change", "u", None)).is_ok());
    }

    #[tokio::test]
    async fn test_post_reaches_link() {
        let (page, mut link) = page_channel(ORIGIN, 8);

        page.port
            .post(OutboundEnvelope::new("change", "u", None))
            .unwrap();

        let env = link.recv().await.unwrap();
        assert_eq!(env.kind, "change");
        assert_eq!(env.uuid, "u");
    }

    #[tokio::test]
    async fn test_foreign_origin_dropped() {
        let (page, mut link) = page_channel(ORIGIN, 8);

        page.port
            .post_to(
                OutboundEnvelope::new("value", "u", None),
                "https://evil.example".to_string(),
            )
            .unwrap();
        page.port
            .post(OutboundEnvelope::new("change", "u", None))
            .unwrap();

        let env = link.recv().await.unwrap();
        assert_eq!(env.kind, "change");
        assert!(link.try_recv().is_none());
    }

    #[test]
    fn test_full_queue_is_backpressure() {
        let (page, _link) = page_channel(ORIGIN, 1);

        page.port
            .post(OutboundEnvelope::new("change", "u", None))
            .unwrap();
        let result = page.port.post(OutboundEnvelope::new("change", "u", None));
        assert!(matches!(result, Err(BridgeError::Backpressure)));
    }

    #[test]
    fn test_closed_queue() {
        let (page, link) = page_channel(ORIGIN, 4);
        drop(link);

        let result = page.port.post(OutboundEnvelope::new("change", "u", None));
        assert!(matches!(result, Err(BridgeError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_send_envelope_reaches_page() {
        let (mut page, link) = page_channel(ORIGIN, 4);

        link.send_envelope("getValue", "u", json!({})).await.unwrap();

        let value = page.inbound.recv().await.unwrap();
        assert_eq!(value, json!({ "type": "getValue", "uuid": "u", "payload": {} }));
    }

    #[tokio::test]
    async fn test_close_inbound() {
        let (mut page, mut link) = page_channel(ORIGIN, 4);
        let forwarder = link.inbound_sender().unwrap();

        link.close_inbound();
        assert!(link.inbound_sender().is_none());
        assert!(matches!(
            link.send(json!({})).await,
            Err(BridgeError::ChannelClosed)
        ));

        forwarder.send(json!({ "type": "getValue" })).await.unwrap();
        drop(forwarder);
        assert!(page.inbound.recv().await.is_some());
        assert!(page.inbound.recv().await.is_none());

        page.port
            .post(OutboundEnvelope::new("change", "u", None))
            .unwrap();
        assert_eq!(link.recv().await.unwrap().kind, "change");
    }

    #[tokio::test]
    async fn test_recv_none_after_ports_dropped() {
        let (page, mut link) = page_channel(ORIGIN, 4);
        drop(page);
        assert!(link.recv().await.is_none());
    }
}
