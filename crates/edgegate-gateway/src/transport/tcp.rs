//! Raw TCP client listener. Frames are u32 big-endian length-prefixed JSON.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Duration;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::app_state::AppState;
use crate::transport::session::ClientSession;

/// Accept loop. Runs until the task is aborted.
pub async fn serve(listener: TcpListener, app: AppState) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if app.is_draining() {
                    continue;
                }
                tokio::spawn(run_connection(app.clone(), stream, peer));
            }
            Err(e) => {
                tracing::warn!(error = %e, "tcp accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn run_connection(app: AppState, stream: TcpStream, peer: SocketAddr) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(peer = %peer, error = %e, "client nodelay not set");
    }
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(app.cfg().limits.max_frame_bytes)
        .new_codec();
    let (mut sink, mut frames) = Framed::new(stream, codec).split();

    let (session, mut outbound) = ClientSession::open(&app, peer.to_string());
    let conn = session.conn();
    let id = session.id();

    loop {
        tokio::select! {
            maybe_out = outbound.recv() => {
                let Some(m) = maybe_out else { break; };
                if sink.send(m.bytes()).await.is_err() {
                    break;
                }
            }

            incoming = frames.next() => {
                match incoming {
                    Some(Ok(frame)) => session.handle_frame(&frame).await,
                    Some(Err(e)) => {
                        tracing::debug!(session = id, error = %e, "tcp client read failed");
                        break;
                    }
                    None => break,
                }
            }

            _ = conn.closed() => {
                tracing::info!(session = id, "closing client on request");
                break;
            }
        }
    }

    tracing::debug!(session = id, "tcp session ended");
}
