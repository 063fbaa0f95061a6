//! WebSocket handler.
//!
//! - Upgrade HTTP -> WS (refused while draining)
//! - Decode-once: each text/binary frame is one JSON payload
//! - Outbound frames come from the session queue
//! - Keepalive ping; a close request from a worker drops the socket

use std::net::SocketAddr;

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::time::Duration;

use crate::app_state::AppState;
use crate::transport::codec::{decode, Inbound};
use crate::transport::session::ClientSession;

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }
    let max = app.cfg().limits.max_frame_bytes;
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| run_session(app, peer, socket))
}

async fn run_session(app: AppState, peer: SocketAddr, socket: WebSocket) {
    let (session, mut outbound) = ClientSession::open(&app, peer.to_string());
    let conn = session.conn();
    let id = session.id();

    let (mut ws_tx, mut ws_rx) = socket.split();

    let ping_every = Duration::from_millis(app.cfg().gateway.ws_ping_interval_ms);
    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            maybe_out = outbound.recv() => {
                let Some(m) = maybe_out else { break; };
                if ws_tx.send(m.to_ws_message()).await.is_err() {
                    break;
                }
            }

            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                match decode(msg) {
                    Inbound::Payload(raw) => session.handle_frame(&raw).await,
                    Inbound::Ping(v) => {
                        if ws_tx.send(Message::Pong(v)).await.is_err() {
                            break;
                        }
                    }
                    Inbound::Pong => {}
                    Inbound::Close => break,
                }
            }

            _ = conn.closed() => {
                tracing::info!(session = id, "closing client on request");
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }

            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(session = id, "ws session ended");
}
