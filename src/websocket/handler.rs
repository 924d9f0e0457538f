// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2026 traderepublic-rs contributors. All rights reserved.
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! WebSocket message handler for the subscription stream.
//!
//! The handler runs in a dedicated Tokio task as the I/O boundary between the
//! client orchestrator and the network. It exclusively owns the socket, the
//! subscription registry, and the per-subscription snapshot texts, so no other
//! task ever touches routing state. Commands arrive from the client over an
//! unbounded channel and interleave with inbound frames in a single select
//! loop.
//!
//! Consumer channels are delivered to synchronously with frame receipt: a slow
//! consumer backs up only its own queue, never the socket.

use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    net::TcpStream,
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use super::{
    ConnectionState,
    delta::apply_delta,
    error::TradeRepublicWsError,
    messages::{self, FrameKind, ServerFrame, SubscriptionEvent, TradeRepublicWsMessage},
    registry::SubscriptionRegistry,
};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Commands sent from the client to the handler.
pub(crate) enum HandlerCommand {
    /// Install a subscription entry and send `sub <id> <topic>`.
    Subscribe {
        id: u64,
        topic: Value,
        event_tx: UnboundedSender<SubscriptionEvent>,
    },
    /// Send `unsub <id> <topic>`. The entry stays installed until the server
    /// delivers its close frame, so in-flight frames still route.
    Unsubscribe { id: u64, topic: Value },
    /// Send a raw text frame verbatim.
    SendRaw(String),
    /// Close the socket and drop all subscription state.
    Disconnect,
}

/// Feed handler owning the socket and all routing state.
pub(crate) struct FeedHandler {
    ws: WsStream,
    cmd_rx: UnboundedReceiver<HandlerCommand>,
    out_tx: UnboundedSender<TradeRepublicWsMessage>,
    registry: SubscriptionRegistry,
    connection_state: Arc<AtomicU8>,
}

impl FeedHandler {
    pub(crate) fn new(
        ws: WsStream,
        cmd_rx: UnboundedReceiver<HandlerCommand>,
        out_tx: UnboundedSender<TradeRepublicWsMessage>,
        connection_state: Arc<AtomicU8>,
    ) -> Self {
        Self {
            ws,
            cmd_rx,
            out_tx,
            registry: SubscriptionRegistry::new(),
            connection_state,
        }
    }

    pub(crate) async fn run(mut self) {
        let _ = self.out_tx.send(TradeRepublicWsMessage::Connected);

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(HandlerCommand::Disconnect) | None => {
                        tracing::debug!("Disconnecting stream");
                        let _ = self.ws.close(None).await;
                        self.finish(ConnectionState::Closed, None);
                        break;
                    }
                    Some(cmd) => {
                        if let Err(e) = self.process_command(cmd).await {
                            tracing::error!("Outbound send failed: {e}");
                            self.finish(ConnectionState::Failed, Some(e));
                            break;
                        }
                    }
                },
                msg = self.ws.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.process_frame(text.as_str()),
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = self.ws.send(Message::Pong(payload)).await {
                            let e = TradeRepublicWsError::Transport(e.to_string());
                            tracing::error!("Failed to answer ping: {e}");
                            self.finish(ConnectionState::Failed, Some(e));
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Stream closed by server");
                        self.finish(ConnectionState::Closed, None);
                        break;
                    }
                    // The protocol is text only; other frames are ignored
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let e = TradeRepublicWsError::Transport(e.to_string());
                        tracing::error!("Transport error: {e}");
                        self.finish(ConnectionState::Failed, Some(e));
                        break;
                    }
                },
            }
        }
    }

    /// Tears down routing state and emits the terminal lifecycle event.
    fn finish(&mut self, state: ConnectionState, error: Option<TradeRepublicWsError>) {
        // Dropping the entries closes every consumer channel without a
        // synthetic close event.
        self.registry.clear();
        self.connection_state.store(state.as_u8(), Ordering::Relaxed);
        let msg = match error {
            Some(e) => TradeRepublicWsMessage::Error(e),
            None => TradeRepublicWsMessage::Closed,
        };
        let _ = self.out_tx.send(msg);
    }

    async fn process_command(&mut self, cmd: HandlerCommand) -> Result<(), TradeRepublicWsError> {
        match cmd {
            HandlerCommand::Subscribe { id, topic, event_tx } => {
                let frame = messages::sub_frame(id, &topic)?;
                if self.registry.install(id, topic, event_tx).is_some() {
                    tracing::warn!(id, "Replaced existing subscription entry");
                }
                tracing::debug!(id, "Subscribing");
                self.send_text(frame).await
            }
            HandlerCommand::Unsubscribe { id, topic } => {
                let frame = messages::unsub_frame(id, &topic)?;
                tracing::debug!(id, "Unsubscribing");
                self.send_text(frame).await
            }
            HandlerCommand::SendRaw(text) => self.send_text(text).await,
            // Handled in the run loop
            HandlerCommand::Disconnect => Ok(()),
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), TradeRepublicWsError> {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TradeRepublicWsError::Send(e.to_string()))
    }

    /// Routes one inbound text frame.
    ///
    /// Protocol anomalies (undecodable frames, non-JSON snapshots, deltas
    /// without a base, non-JSON patch results) are logged and dropped; they
    /// never terminate the channel and never corrupt stored state.
    fn process_frame(&mut self, text: &str) {
        let _ = self.out_tx.send(TradeRepublicWsMessage::Raw(text.to_string()));

        let frame = match ServerFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Undecodable frame: {e}");
                return;
            }
        };

        if frame.kind == FrameKind::Close {
            if let Some(entry) = self.registry.remove(frame.id) {
                tracing::debug!(id = frame.id, "Subscription closed by server");
                let _ = entry.event_tx.send(SubscriptionEvent::Closed);
            } else {
                tracing::debug!(id = frame.id, "Dropping close for unknown id");
            }
            return;
        }

        // The registry gates all routing: frames for ids without an entry
        // (never subscribed, or already closed) are dropped silently.
        let Some(entry) = self.registry.get_mut(frame.id) else {
            tracing::debug!(id = frame.id, "Dropping frame for unknown id");
            return;
        };

        match frame.kind {
            FrameKind::Snapshot => match serde_json::from_str::<Value>(&frame.payload) {
                Ok(document) => {
                    entry.last_snapshot = Some(frame.payload);
                    let _ = entry.event_tx.send(SubscriptionEvent::Update(document));
                }
                Err(e) => {
                    tracing::warn!(id = frame.id, "Snapshot payload is not valid JSON: {e}");
                }
            },
            FrameKind::Delta => {
                let Some(last) = entry.last_snapshot.as_deref() else {
                    tracing::warn!(id = frame.id, "Delta received before any snapshot");
                    return;
                };
                match apply_delta(last, &frame.payload) {
                    Ok(next) => {
                        // The reconstructed text becomes the new base even when
                        // it does not parse: the server chains further deltas
                        // from the exact text it shipped.
                        let document = serde_json::from_str::<Value>(&next);
                        entry.last_snapshot = Some(next);
                        match document {
                            Ok(document) => {
                                let _ = entry.event_tx.send(SubscriptionEvent::Update(document));
                            }
                            Err(e) => {
                                tracing::warn!(
                                    id = frame.id,
                                    "Patched document is not valid JSON: {e}"
                                );
                            }
                        }
                    }
                    Err(e) => tracing::warn!(id = frame.id, "Failed to apply delta: {e}"),
                }
            }
            // Handled above
            FrameKind::Close => {}
        }
    }
}
