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

//! Frame encoding/decoding and message types for the subscription stream.
//!
//! Frames are single ASCII-delimited lines. Outbound control frames are
//! `connect 31 <json>`, `sub <id> <json>`, and `unsub <id> <json>`; inbound
//! frames are `<id> <kind> <payload…>` where the payload is everything after
//! the second space, unmodified.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::error::TradeRepublicWsError;
use crate::common::consts::{
    DEFAULT_LOCALE, RESERVED_CONNECT_ID, TRADE_REPUBLIC_CLIENT_ID, TRADE_REPUBLIC_CLIENT_VERSION,
    TRADE_REPUBLIC_PLATFORM_ID,
};

/// Kind discriminator of an inbound server frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `A`: a full JSON document for the subscription.
    Snapshot,
    /// `D`: a textual patch against the previous snapshot text.
    Delta,
    /// `C`: server-initiated termination of the subscription.
    Close,
}

impl FrameKind {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Snapshot),
            "D" => Some(Self::Delta),
            "C" => Some(Self::Close),
            _ => None,
        }
    }
}

/// Errors raised while decoding an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameParseError {
    /// The leading token was not a decimal identifier.
    #[error("Invalid frame id: `{0}`")]
    InvalidId(String),
    /// The frame had no kind token.
    #[error("Frame has no kind token")]
    MissingKind,
    /// The kind token was not one of `A`, `D`, `C`.
    #[error("Unknown frame kind: `{0}`")]
    UnknownKind(String),
}

/// A decoded inbound frame: `(id, kind, payload)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFrame {
    pub id: u64,
    pub kind: FrameKind,
    /// Everything after the second space, verbatim. Empty for `C` frames.
    pub payload: String,
}

impl ServerFrame {
    /// Decodes a raw text frame.
    ///
    /// Payload bytes are preserved unmodified, including embedded spaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or kind token is malformed.
    pub fn parse(text: &str) -> Result<Self, FrameParseError> {
        let mut parts = text.splitn(3, ' ');
        let id_token = parts.next().unwrap_or_default();
        let id = id_token
            .parse::<u64>()
            .map_err(|_| FrameParseError::InvalidId(id_token.to_string()))?;
        let kind_token = parts.next().ok_or(FrameParseError::MissingKind)?;
        let kind = FrameKind::from_code(kind_token)
            .ok_or_else(|| FrameParseError::UnknownKind(kind_token.to_string()))?;
        let payload = parts.next().unwrap_or_default().to_string();
        Ok(Self { id, kind, payload })
    }
}

/// Identity payload of the `connect` handshake frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakePayload {
    pub locale: String,
    pub platform_id: String,
    pub client_id: String,
    pub client_version: String,
}

impl HandshakePayload {
    /// Creates the handshake payload for the given locale.
    #[must_use]
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            platform_id: TRADE_REPUBLIC_PLATFORM_ID.to_string(),
            client_id: TRADE_REPUBLIC_CLIENT_ID.to_string(),
            client_version: TRADE_REPUBLIC_CLIENT_VERSION.to_string(),
        }
    }
}

impl Default for HandshakePayload {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

/// Encodes the handshake frame sent once when the transport opens.
///
/// # Errors
///
/// Returns an error if the payload fails to serialize.
pub fn connect_frame(payload: &HandshakePayload) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(format!("connect {RESERVED_CONNECT_ID} {json}"))
}

/// Encodes a subscribe frame for `id` and the caller's topic.
///
/// # Errors
///
/// Returns an error if the topic fails to serialize.
pub fn sub_frame(id: u64, topic: &Value) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(topic)?;
    Ok(format!("sub {id} {json}"))
}

/// Encodes an unsubscribe frame, echoing the topic alongside the id.
///
/// # Errors
///
/// Returns an error if the topic fails to serialize.
pub fn unsub_frame(id: u64, topic: &Value) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(topic)?;
    Ok(format!("unsub {id} {json}"))
}

/// Event delivered to one subscription's consumer.
#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    /// The current document, after a snapshot or a successfully applied delta.
    Update(Value),
    /// The server closed the subscription; no further events follow.
    Closed,
}

/// Lifecycle and raw-frame events of the streaming connection.
#[derive(Debug, Clone)]
pub enum TradeRepublicWsMessage {
    /// The transport opened and the handshake frame was sent.
    Connected,
    /// An inbound text frame, unmodified.
    Raw(String),
    /// The transport failed; the session is terminal.
    Error(TradeRepublicWsError),
    /// The connection closed.
    Closed,
}
