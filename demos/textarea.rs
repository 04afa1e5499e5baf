//! Textarea demo - drives an in-memory element from the injector side.
//!
//! This demo shows:
//! - Binding an element with the builder
//! - Reading and writing the value through envelopes
//! - A user edit echoed as `change`, an injected write not echoed
//!
//! Run with `cargo run --example textarea`.

use std::sync::{Arc, Mutex};

use injector_bridge::protocol::UpdateOptions;
use injector_bridge::{Bridge, ChangeCallback, ElementBinding, Result, Silencer};
use serde_json::{json, Value};

/// A textarea without a DOM: a shared string plus a change listener.
#[derive(Clone, Default)]
struct Textarea {
    inner: Arc<Mutex<(String, Option<ChangeCallback>)>>,
}

impl Textarea {
    fn input(&self, text: &str) {
        let listener = {
            let mut inner = self.inner.lock().unwrap();
            inner.0 = text.to_string();
            inner.1.clone()
        };
        if let Some(listener) = listener {
            listener.notify();
        }
    }
}

impl ElementBinding for Textarea {
    fn get_value(&self) -> Result<String> {
        Ok(self.inner.lock().unwrap().0.clone())
    }

    fn set_value(
        &mut self,
        value: Option<&str>,
        _options: &UpdateOptions,
        silencer: &Silencer,
    ) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        silencer.execute_silenced(|| self.input(value));
        Ok(())
    }

    fn bind_change(&mut self, on_change: ChangeCallback) -> Result<()> {
        self.inner.lock().unwrap().1 = Some(on_change);
        Ok(())
    }

    fn extension(&self) -> Option<Value> {
        Some(json!({ "kind": "textarea" }))
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let textarea = Textarea::default();
    textarea.input("hello from the page");

    let (bridge, mut link) = Bridge::builder()
        .origin("https://example.com")
        .start(textarea.clone())
        .await?;
    let uuid = bridge.uuid().to_string();

    // ready
    if let Some(envelope) = link.recv().await {
        eprintln!("<- {}", envelope.to_value());
    }

    link.send_envelope("getValue", &uuid, json!({})).await?;
    if let Some(envelope) = link.recv().await {
        eprintln!("<- {}", envelope.to_value());
    }

    // Injected write: no change comes back, only the value we ask for.
    link.send_envelope("setValue", &uuid, json!({ "text": "hello from the editor" }))
        .await?;
    link.send_envelope("getValue", &uuid, json!({})).await?;
    if let Some(envelope) = link.recv().await {
        eprintln!("<- {}", envelope.to_value());
    }

    // User edit: change comes back.
    textarea.input("hello again from the page");
    if let Some(envelope) = link.recv().await {
        eprintln!("<- {}", envelope.to_value());
    }

    drop(link);
    bridge.wait_for_shutdown().await?;
    Ok(())
}
