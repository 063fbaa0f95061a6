use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UnixDatagram;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::codec::{decode_payload, encode_body};
use edgegate_core::protocol::Body;

use super::LocalLink;
use crate::obs::GatewayMetrics;

/// Unix datagram socket used both to reach colocated workers and to receive
/// their replies. One datagram carries one payload.
pub struct UnixLocalLink {
    path: PathBuf,
    reply_addr: String,
    tx: mpsc::Sender<(String, Bytes)>,
    writer: JoinHandle<()>,
}

impl UnixLocalLink {
    /// Bind the reply socket at `path`, replacing a stale file.
    pub fn bind(
        path: &Path,
        queue: usize,
        max_frame_bytes: usize,
        metrics: Arc<GatewayMetrics>,
    ) -> Result<(Self, LocalReader)> {
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| {
                EdgeError::Internal(format!("remove stale socket {} failed: {e}", path.display()))
            })?;
        }
        let sock = UnixDatagram::bind(path)
            .map(Arc::new)
            .map_err(|e| EdgeError::Internal(format!("bind {} failed: {e}", path.display())))?;

        let (tx, mut rx) = mpsc::channel::<(String, Bytes)>(queue);
        let writer = {
            let sock = Arc::clone(&sock);
            tokio::spawn(async move {
                while let Some((addr, frame)) = rx.recv().await {
                    if let Err(e) = sock.send_to(&frame, &addr).await {
                        metrics.uplink_failures.inc(&[("link", "local")]);
                        tracing::warn!(to = %addr, error = %e, "local datagram send failed");
                    }
                }
            })
        };

        let reply_addr = path.to_string_lossy().into_owned();
        tracing::info!(socket = %reply_addr, "local channel bound");

        let reader = LocalReader {
            sock,
            buf: vec![0u8; max_frame_bytes],
        };
        Ok((
            Self {
                path: path.to_path_buf(),
                reply_addr,
                tx,
                writer,
            },
            reader,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalLink for UnixLocalLink {
    fn reply_addr(&self) -> &str {
        &self.reply_addr
    }

    fn send_to(&self, addr: &str, payload: &Body) -> Result<()> {
        let frame = encode_body(payload)?;
        self.tx
            .try_send((addr.to_string(), frame))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    EdgeError::Unavailable("local channel queue full".into())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    EdgeError::Unavailable("local channel closed".into())
                }
            })
    }
}

impl Drop for UnixLocalLink {
    fn drop(&mut self) {
        self.writer.abort();
    }
}

/// Inbound half of the local channel (worker replies).
pub struct LocalReader {
    sock: Arc<UnixDatagram>,
    buf: Vec<u8>,
}

impl LocalReader {
    pub async fn next_payload(&mut self) -> Option<Result<Body>> {
        match self.sock.recv_from(&mut self.buf).await {
            Ok((n, _)) => Some(decode_payload(&self.buf[..n])),
            Err(e) => {
                tracing::warn!(error = %e, "local channel read failed");
                None
            }
        }
    }
}
