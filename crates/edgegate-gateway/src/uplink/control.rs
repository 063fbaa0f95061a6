use std::sync::Arc;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::codec::{decode_payload, encode_envelope};
use edgegate_core::protocol::{Body, Envelope};

use super::ControlLink;
use crate::obs::GatewayMetrics;

fn frame_codec(max_frame_bytes: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_bytes)
        .new_codec()
}

/// Length-framed TCP connection to the master, written by a single task.
pub struct TcpControlLink {
    peer: String,
    tx: mpsc::Sender<Bytes>,
    writer: JoinHandle<()>,
}

impl TcpControlLink {
    /// Dial the master. Returns the send half and the inbound frame reader.
    pub async fn connect(
        addr: &str,
        queue: usize,
        max_frame_bytes: usize,
        metrics: Arc<GatewayMetrics>,
    ) -> Result<(Self, ControlReader)> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| EdgeError::Unavailable(format!("connect control {addr} failed: {e}")))?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "control link nodelay not set");
        }

        let (read_half, write_half) = stream.into_split();
        let mut sink = FramedWrite::new(write_half, frame_codec(max_frame_bytes));
        let (tx, mut rx) = mpsc::channel::<Bytes>(queue);

        let peer = addr.to_string();
        let writer = {
            let peer = peer.clone();
            tokio::spawn(async move {
                while let Some(frame) = rx.recv().await {
                    if let Err(e) = sink.send(frame).await {
                        metrics.uplink_failures.inc(&[("link", "control")]);
                        tracing::warn!(peer = %peer, error = %e, "control link write failed");
                        break;
                    }
                }
                tracing::debug!(peer = %peer, "control link writer stopped");
            })
        };

        let reader = ControlReader {
            frames: FramedRead::new(read_half, frame_codec(max_frame_bytes)),
        };

        tracing::info!(peer = %peer, "control link connected");
        Ok((Self { peer, tx, writer }, reader))
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

impl ControlLink for TcpControlLink {
    fn send(&self, env: &Envelope) -> Result<()> {
        let frame = encode_envelope(env)?;
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                EdgeError::Unavailable("control link queue full".into())
            }
            mpsc::error::TrySendError::Closed(_) => {
                EdgeError::Unavailable("control link closed".into())
            }
        })
    }
}

impl Drop for TcpControlLink {
    fn drop(&mut self) {
        self.writer.abort();
    }
}

/// Inbound half of the control connection.
pub struct ControlReader {
    frames: FramedRead<OwnedReadHalf, LengthDelimitedCodec>,
}

impl ControlReader {
    /// Next decoded payload. `None` once the connection is gone; a frame that
    /// fails to decode yields `Some(Err(..))` and the stream continues.
    pub async fn next_payload(&mut self) -> Option<Result<Body>> {
        match self.frames.next().await? {
            Ok(frame) => Some(decode_payload(&frame)),
            Err(e) => {
                tracing::warn!(error = %e, "control link read failed");
                None
            }
        }
    }
}
