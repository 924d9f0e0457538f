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
//! This module provides a two-layer client architecture:
//! - Outer client: orchestrator managing connection state and id allocation.
//! - Inner handler: I/O boundary running in a dedicated Tokio task, exclusively
//!   owning the socket, the subscription registry, and the per-subscription
//!   snapshot texts.
//!
//! The wire protocol is line-oriented: the client opens with a single
//! `connect 31 <json>` handshake, subscribes with `sub <id> <json>`, and the
//! server answers per id with `A` (JSON snapshot), `D` (textual delta against
//! the previous snapshot text), and `C` (subscription closed) frames.

pub mod client;
pub mod delta;
pub mod error;
pub mod messages;
pub mod registry;

pub(crate) mod handler;

pub use client::{Subscription, TradeRepublicWebSocketClient};
pub use delta::apply_delta;
pub use messages::{SubscriptionEvent, TradeRepublicWsMessage};

/// Lifecycle state of the streaming connection.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected.
    Init = 0,
    /// `connect()` in flight.
    Opening = 1,
    /// Handshake sent; subscriptions may be opened.
    Open = 2,
    /// Terminated by a transport error.
    Failed = 3,
    /// Closed by either side.
    Closed = 4,
}

impl ConnectionState {
    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Init,
            1 => Self::Opening,
            2 => Self::Open,
            3 => Self::Failed,
            _ => Self::Closed,
        }
    }
}
