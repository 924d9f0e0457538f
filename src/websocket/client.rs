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

//! WebSocket client for the Trade Republic subscription stream.
//!
//! [`TradeRepublicWebSocketClient`] is the orchestrator: it opens the socket,
//! performs the `connect 31` handshake, and hands the stream to a dedicated
//! handler task that owns all routing state. Subscribing returns a
//! [`Subscription`] whose channel delivers the decoded document after every
//! snapshot and every successfully applied delta, followed by a close
//! notification when the server terminates the subscription.
//!
//! The client never reconnects on its own: a transport failure is terminal for
//! the session and surfaced on [`stream`](TradeRepublicWebSocketClient::stream).

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use futures_util::{SinkExt, Stream};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::{
            HeaderValue,
            header::{COOKIE, ORIGIN, USER_AGENT},
        },
        protocol::Message,
    },
};

use super::{
    ConnectionState,
    error::TradeRepublicWsError,
    handler::{FeedHandler, HandlerCommand},
    messages::{self, HandshakePayload, SubscriptionEvent, TradeRepublicWsMessage},
    registry::SubscriptionIdAllocator,
};
use crate::common::consts::{
    DEFAULT_LOCALE, RESERVED_CONNECT_ID, TRADE_REPUBLIC_ORIGIN, TRADE_REPUBLIC_USER_AGENT,
    TRADE_REPUBLIC_WS_URL,
};

const DISCONNECT_TIMEOUT_SECS: u64 = 5;

/// Handle to one active subscription.
///
/// Dropping the handle stops consuming events but does not unsubscribe; call
/// [`TradeRepublicWebSocketClient::unsubscribe`] to signal the server.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    events: UnboundedReceiver<SubscriptionEvent>,
}

impl Subscription {
    /// Returns the identifier tagging every frame of this subscription.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receives the next event, or `None` once the stream is torn down.
    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }
}

/// WebSocket client for connecting to the Trade Republic stream.
pub struct TradeRepublicWebSocketClient {
    url: String,
    locale: String,
    cookies: Vec<String>,
    connection_state: Arc<AtomicU8>,
    allocator: Arc<SubscriptionIdAllocator>,
    cmd_tx: Option<UnboundedSender<HandlerCommand>>,
    out_rx: Option<UnboundedReceiver<TradeRepublicWsMessage>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Debug for TradeRepublicWebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TradeRepublicWebSocketClient))
            .field("url", &self.url)
            .field("locale", &self.locale)
            .field("cookie_count", &self.cookies.len())
            .field("connection_state", &self.connection_state())
            .finish_non_exhaustive()
    }
}

impl TradeRepublicWebSocketClient {
    /// Creates a new [`TradeRepublicWebSocketClient`] with the given session
    /// cookies.
    ///
    /// # Errors
    ///
    /// Returns an error if `cookies` is empty: the stream upgrade is rejected
    /// by the backend without an authenticated session.
    pub fn new(
        cookies: Vec<String>,
        locale: Option<String>,
        url: Option<String>,
    ) -> Result<Self, TradeRepublicWsError> {
        if cookies.is_empty() {
            return Err(TradeRepublicWsError::MissingCookies);
        }

        Ok(Self {
            url: url.unwrap_or_else(|| TRADE_REPUBLIC_WS_URL.to_string()),
            locale: locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            cookies,
            connection_state: Arc::new(AtomicU8::new(ConnectionState::Init.as_u8())),
            allocator: Arc::new(SubscriptionIdAllocator::new()),
            cmd_tx: None,
            out_rx: None,
            task_handle: None,
        })
    }

    /// Returns the WebSocket URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.connection_state.load(Ordering::Relaxed))
    }

    /// Returns whether the client is connected and usable.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.connection_state() == ConnectionState::Open
    }

    /// Connects to the stream and performs the `connect 31` handshake.
    ///
    /// Resolves once the transport is open and the handshake frame has been
    /// written; subscriptions may be opened afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is already connected, the upgrade fails,
    /// or the handshake frame cannot be sent.
    pub async fn connect(&mut self) -> Result<(), TradeRepublicWsError> {
        if self.connection_state() == ConnectionState::Open {
            return Err(TradeRepublicWsError::AlreadyConnected);
        }

        tracing::info!("Connecting to Trade Republic stream: {}", self.url);
        self.set_state(ConnectionState::Opening);

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TradeRepublicWsError::Handshake(e.to_string()))?;
        let cookie_header = HeaderValue::from_str(&self.cookies.join("; "))
            .map_err(|e| TradeRepublicWsError::Handshake(e.to_string()))?;
        let headers = request.headers_mut();
        headers.insert(COOKIE, cookie_header);
        headers.insert(ORIGIN, HeaderValue::from_static(TRADE_REPUBLIC_ORIGIN));
        headers.insert(USER_AGENT, HeaderValue::from_static(TRADE_REPUBLIC_USER_AGENT));

        let (mut ws, _response) = match connect_async(request).await {
            Ok(ok) => ok,
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                return Err(TradeRepublicWsError::Handshake(e.to_string()));
            }
        };

        let handshake = messages::connect_frame(&HandshakePayload::new(&self.locale))?;
        if let Err(e) = ws.send(Message::Text(handshake.into())).await {
            self.set_state(ConnectionState::Failed);
            return Err(TradeRepublicWsError::Send(e.to_string()));
        }

        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (out_tx, out_rx) = unbounded_channel();
        self.cmd_tx = Some(cmd_tx);
        self.out_rx = Some(out_rx);
        self.set_state(ConnectionState::Open);

        let handler = FeedHandler::new(ws, cmd_rx, out_tx, self.connection_state.clone());
        self.task_handle = Some(tokio::spawn(handler.run()));

        tracing::info!("Connected to Trade Republic stream");
        Ok(())
    }

    /// Closes the connection and drops all subscription state.
    ///
    /// This is a hard cancel: consumer channels close without a synthetic
    /// close event.
    pub async fn disconnect(&mut self) {
        tracing::info!("Disconnecting from Trade Republic stream");

        if let Some(cmd_tx) = self.cmd_tx.take() {
            let _ = cmd_tx.send(HandlerCommand::Disconnect);
        }
        if let Some(handle) = self.task_handle.take()
            && tokio::time::timeout(Duration::from_secs(DISCONNECT_TIMEOUT_SECS), handle)
                .await
                .is_err()
        {
            tracing::warn!("Timed out waiting for the stream task to stop");
        }
        self.set_state(ConnectionState::Closed);
    }

    /// Subscribes to a topic, allocating a fresh identifier.
    ///
    /// Does not suspend: the subscribe frame is enqueued and the handle is
    /// returned immediately. The first event delivered is the topic's initial
    /// snapshot document.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn subscribe(&self, topic: Value) -> Result<Subscription, TradeRepublicWsError> {
        let id = self.allocator.next_id();
        self.subscribe_with_id(id, topic)
    }

    /// Subscribes to a topic under a caller-chosen identifier.
    ///
    /// The identifier must not collide with a live subscription or the
    /// reserved handshake id; prefer [`subscribe`](Self::subscribe) unless the
    /// id must be controlled externally.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected or `id` is reserved.
    pub fn subscribe_with_id(
        &self,
        id: u64,
        topic: Value,
    ) -> Result<Subscription, TradeRepublicWsError> {
        if id == RESERVED_CONNECT_ID {
            return Err(TradeRepublicWsError::ReservedId(id));
        }
        let cmd_tx = self.command_sender()?;
        let (event_tx, events) = unbounded_channel();
        cmd_tx
            .send(HandlerCommand::Subscribe { id, topic, event_tx })
            .map_err(|e| TradeRepublicWsError::Send(e.to_string()))?;
        Ok(Subscription { id, events })
    }

    /// Signals the server to stop a subscription, echoing its topic.
    ///
    /// The local entry is *not* removed: the server's close frame evicts it,
    /// so frames already in flight still reach the consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn unsubscribe(&self, id: u64, topic: Value) -> Result<(), TradeRepublicWsError> {
        let cmd_tx = self.command_sender()?;
        cmd_tx
            .send(HandlerCommand::Unsubscribe { id, topic })
            .map_err(|e| TradeRepublicWsError::Send(e.to_string()))
    }

    /// Sends a raw text frame verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn send(&self, raw: impl Into<String>) -> Result<(), TradeRepublicWsError> {
        let cmd_tx = self.command_sender()?;
        cmd_tx
            .send(HandlerCommand::SendRaw(raw.into()))
            .map_err(|e| TradeRepublicWsError::Send(e.to_string()))
    }

    /// Returns the stream of lifecycle and raw-frame events.
    ///
    /// # Panics
    ///
    /// Panics if called before `connect()` or if the stream was already taken.
    pub fn stream(&mut self) -> impl Stream<Item = TradeRepublicWsMessage> + use<> {
        let rx = self
            .out_rx
            .take()
            .expect("Lifecycle stream already taken or client not connected");
        futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        })
    }

    fn command_sender(&self) -> Result<&UnboundedSender<HandlerCommand>, TradeRepublicWsError> {
        if self.connection_state() != ConnectionState::Open {
            return Err(TradeRepublicWsError::NotConnected);
        }
        self.cmd_tx.as_ref().ok_or(TradeRepublicWsError::NotConnected)
    }

    fn set_state(&self, state: ConnectionState) {
        self.connection_state.store(state.as_u8(), Ordering::Relaxed);
    }
}
