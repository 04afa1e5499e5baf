//! Stdio bridge - runs a handler as a child of the injector process.
//!
//! Inbound envelopes are read from stdin as JSON lines, outbound envelopes
//! are written to stdout as JSON lines.
//!
//! ```text
//! $ cargo run --example stdio_bridge
//! {"type":"ready","uuid":"demo","payload":{}}
//! {"type":"setValue","uuid":"demo","payload":{"text":"hi"}}
//! {"type":"getValue","uuid":"demo","payload":{}}
//! {"type":"value","uuid":"demo","payload":{"text":"hi"}}
//! ```

use injector_bridge::protocol::UpdateOptions;
use injector_bridge::transport::{forward_stdin_lines, write_envelopes};
use injector_bridge::{Bridge, ChangeCallback, ElementBinding, Result, Silencer};

/// Element holding a plain string.
#[derive(Default)]
struct Buffer {
    text: String,
    on_change: Option<ChangeCallback>,
}

impl ElementBinding for Buffer {
    fn get_value(&self) -> Result<String> {
        Ok(self.text.clone())
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
        silencer.execute_silenced(|| {
            self.text = value.to_string();
            if let Some(cb) = &self.on_change {
                cb.notify();
            }
        });
        Ok(())
    }

    fn bind_change(&mut self, on_change: ChangeCallback) -> Result<()> {
        self.on_change = Some(on_change);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (bridge, mut link) = Bridge::builder()
        .uuid("demo")
        .start(Buffer::default())
        .await?;

    let inbound = link.inbound_sender().ok_or("inbound channel closed")?;
    let forwarder = tokio::spawn(forward_stdin_lines(inbound));
    // From here on stdin is the only inbound source.
    link.close_inbound();

    let writer = tokio::spawn(async move { write_envelopes(&mut link, tokio::io::stdout()).await });

    if let Err(e) = forwarder.await? {
        eprintln!("stdin forwarding stopped: {}", e);
    }
    bridge.wait_for_shutdown().await?;
    writer.await??;
    Ok(())
}
