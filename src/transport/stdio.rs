//! JSON-lines stdio transport.
//!
//! Lets a bridge run as a child of the injector process:
//!
//! - **stdin**: inbound envelopes, one JSON value per line
//! - **stdout**: outbound envelopes, one JSON object per line
//! - **stderr**: logs only (never parsed by the injector)
//!
//! Envelopes are written with an explicit `\n`, never `println!`, which
//! may add `\r\n` on Windows.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use super::InjectorLink;
use crate::error::{BridgeError, Result};
use crate::protocol::{decode_envelope, encode_envelope};

/// Forward JSON lines from `reader` into the inbound queue.
///
/// Blank lines are skipped. Lines that are not valid JSON are logged and
/// skipped. Returns when the reader hits EOF or the queue is closed.
pub async fn forward_lines<R>(reader: R, tx: mpsc::Sender<Value>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value = match decode_envelope(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Skipping malformed inbound line: {}", e);
                continue;
            }
        };

        if tx.send(value).await.is_err() {
            return Err(BridgeError::ChannelClosed);
        }
    }

    Ok(())
}

/// Forward JSON lines from the process stdin into the inbound queue.
pub async fn forward_stdin_lines(tx: mpsc::Sender<Value>) -> Result<()> {
    forward_lines(BufReader::new(tokio::io::stdin()), tx).await
}

/// Write every envelope received on `link` to `writer` as JSON lines.
///
/// Returns when the page side of the channel is gone.
pub async fn write_envelopes<W>(link: &mut InjectorLink, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = link.recv().await {
        let mut line = encode_envelope(&envelope)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
