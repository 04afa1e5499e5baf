//! Integration tests for injector-bridge.
//!
//! These drive a running bridge from the injector end of the channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use injector_bridge::handler::BoxFuture;
use injector_bridge::protocol::{OutboundEnvelope, UpdateOptions};
use injector_bridge::transport::{forward_lines, InjectorLink};
use injector_bridge::{Bridge, BridgeError, ChangeCallback, ElementBinding, Result, Silencer};
use serde_json::{json, Value};

/// State shared between the bound element and the test, standing in for a DOM node.
#[derive(Default)]
struct Node {
    value: String,
    on_change: Option<ChangeCallback>,
    loaded: bool,
}

#[derive(Clone, Default)]
struct SharedTextarea {
    node: Arc<Mutex<Node>>,
    extension: Option<Value>,
}

impl SharedTextarea {
    /// Simulate the user typing into the element.
    fn user_types(&self, text: &str) {
        let cb = {
            let mut node = self.node.lock().unwrap();
            node.value = text.to_string();
            node.on_change.clone()
        };
        if let Some(cb) = cb {
            cb.notify();
        }
    }

    fn value(&self) -> String {
        self.node.lock().unwrap().value.clone()
    }
}

impl ElementBinding for SharedTextarea {
    fn load(&mut self) -> BoxFuture<'_, Result<()>> {
        let node = self.node.clone();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            node.lock().unwrap().loaded = true;
            Ok(())
        })
    }

    fn get_value(&self) -> Result<String> {
        Ok(self.value())
    }

    fn set_value(
        &mut self,
        value: Option<&str>,
        _options: &UpdateOptions,
        silencer: &Silencer,
    ) -> Result<()> {
        let value = value.ok_or_else(|| BridgeError::InvalidPayload {
            kind: "setValue",
            reason: "missing string field `text`".to_string(),
        })?;
        silencer.execute_silenced(|| self.user_types(value));
        Ok(())
    }

    fn bind_change(&mut self, on_change: ChangeCallback) -> Result<()> {
        let mut node = self.node.lock().unwrap();
        if !node.loaded {
            return Err(BridgeError::Element("bound before load".to_string()));
        }
        node.on_change = Some(on_change);
        Ok(())
    }

    fn extension(&self) -> Option<Value> {
        self.extension.clone()
    }
}

async fn next(link: &mut InjectorLink) -> OutboundEnvelope {
    tokio::time::timeout(Duration::from_secs(1), link.recv())
        .await
        .expect("timed out waiting for envelope")
        .expect("channel closed")
}

async fn start(element: SharedTextarea) -> (Bridge, InjectorLink) {
    Bridge::builder()
        .uuid("e2e")
        .origin("https://example.com")
        .channel_capacity(16)
        .start(element)
        .await
        .unwrap()
}

/// Ready is the first envelope and carries the capability descriptor.
#[tokio::test]
async fn test_ready_announced_with_extension() {
    let element = SharedTextarea {
        extension: Some(json!({ "mode": "markdown" })),
        ..SharedTextarea::default()
    };
    let (bridge, mut link) = start(element).await;

    let ready = next(&mut link).await;
    assert_eq!(ready.kind, "ready");
    assert_eq!(ready.uuid, bridge.uuid());
    assert_eq!(ready.payload["extension"], json!({ "mode": "markdown" }));
}

/// Full exchange: get, set (no echo), user edit (change), get again.
#[tokio::test]
async fn test_value_synchronization_round() {
    let element = SharedTextarea::default();
    element.user_types("initial");
    let (_bridge, mut link) = start(element.clone()).await;
    assert_eq!(next(&mut link).await.kind, "ready");

    link.send_envelope("getValue", "e2e", json!({})).await.unwrap();
    let value = next(&mut link).await;
    assert_eq!(value.to_value(), json!({ "type": "value", "uuid": "e2e", "payload": { "text": "initial" } }));

    link.send_envelope("setValue", "e2e", json!({ "text": "from editor" }))
        .await
        .unwrap();
    link.send_envelope("getValue", "e2e", json!({})).await.unwrap();
    // No change echo precedes the value reply.
    let value = next(&mut link).await;
    assert_eq!(value.kind, "value");
    assert_eq!(value.payload["text"], "from editor");
    assert_eq!(element.value(), "from editor");

    element.user_types("typed by user");
    let change = next(&mut link).await;
    assert_eq!(change.to_value(), json!({ "type": "change", "uuid": "e2e", "payload": {} }));
}

/// Foreign, malformed and unknown envelopes are skipped; bad payloads do not stop the loop.
#[tokio::test]
async fn test_loop_survives_noise() {
    let element = SharedTextarea::default();
    element.user_types("kept");
    let (_bridge, mut link) = start(element).await;
    assert_eq!(next(&mut link).await.kind, "ready");

    link.send_envelope("getValue", "someone-else", json!({})).await.unwrap();
    link.send(json!("garbage")).await.unwrap();
    link.send(json!({ "uuid": "e2e" })).await.unwrap();
    link.send_envelope("scrollTo", "e2e", json!({ "line": 3 })).await.unwrap();
    link.send_envelope("setValue", "e2e", json!({ "nope": true })).await.unwrap();
    link.send_envelope("getValue", "e2e", json!({})).await.unwrap();

    let value = next(&mut link).await;
    assert_eq!(value.kind, "value");
    assert_eq!(value.payload["text"], "kept");
    assert!(link.try_recv().is_none());
}

/// JSON lines from a reader reach the handler.
#[tokio::test]
async fn test_lines_forwarded_into_bridge() {
    let element = SharedTextarea::default();
    element.user_types("via stdio");
    let (_bridge, mut link) = start(element).await;
    assert_eq!(next(&mut link).await.kind, "ready");

    let input: &[u8] = b"not json\n{\"type\":\"getValue\",\"uuid\":\"e2e\",\"payload\":{}}\n";
    forward_lines(input, link.inbound_sender().unwrap())
        .await
        .unwrap();

    let value = next(&mut link).await;
    assert_eq!(value.payload["text"], "via stdio");
}

/// Closing the injector side ends the dispatch loop.
#[tokio::test]
async fn test_shutdown_when_injector_leaves() {
    let (bridge, link) = start(SharedTextarea::default()).await;

    drop(link);

    tokio::time::timeout(Duration::from_secs(1), bridge.wait_for_shutdown())
        .await
        .expect("bridge did not shut down")
        .unwrap();
}

/// A random uuid is generated when none is configured.
#[tokio::test]
async fn test_generated_uuid() {
    let (bridge, mut link) = Bridge::builder()
        .start(SharedTextarea::default())
        .await
        .unwrap();

    assert_eq!(bridge.uuid().len(), 36);
    assert_eq!(link.origin(), "null");
    assert_eq!(next(&mut link).await.uuid, bridge.uuid());
}
