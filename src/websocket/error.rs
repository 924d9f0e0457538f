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

//! Error structures for the Trade Republic WebSocket integration.

use thiserror::Error;

/// A typed error enumeration for the Trade Republic WebSocket client.
#[derive(Debug, Clone, Error)]
pub enum TradeRepublicWsError {
    /// The stream requires a non-empty session cookie sequence.
    #[error("Session cookies are required to open the stream")]
    MissingCookies,
    /// An operation requiring an open connection was called without one.
    #[error("Not connected")]
    NotConnected,
    /// `connect()` was called on an already open client.
    #[error("Already connected")]
    AlreadyConnected,
    /// The caller requested the id reserved for the handshake frame.
    #[error("Subscription id {0} is reserved for the connect handshake")]
    ReservedId(u64),
    /// The WebSocket upgrade failed.
    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),
    /// The transport failed mid-session; the channel is dead.
    #[error("Transport error: {0}")]
    Transport(String),
    /// An outbound frame could not be written.
    #[error("Send failed: {0}")]
    Send(String),
    /// Failure during JSON serialization of an outbound frame.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TradeRepublicWsError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}
