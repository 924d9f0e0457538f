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

//! Unofficial client SDK for the [Trade Republic](https://traderepublic.com) retail broker.
//!
//! The `traderepublic` crate provides client bindings for the two surfaces the
//! broker backend exposes:
//!
//! - **REST**: phone/PIN + OTP web login, device pairing, and a set of
//!   read-only account endpoints ([`http::client::TradeRepublicHttpClient`]).
//! - **Streaming**: a single long-lived WebSocket multiplexing many concurrent
//!   subscriptions, each delivering an initial JSON snapshot followed by
//!   textual delta patches ([`websocket::client::TradeRepublicWebSocketClient`]).
//!
//! [`client::TradeRepublicClient`] ties both together: it runs the login flow,
//! holds the resulting session cookies, and hands them to the streaming client.
//!
//! Subscription documents are deliberately opaque [`serde_json::Value`]s; the
//! crate reconstructs each document from the server's snapshot/delta stream but
//! never validates its shape. Schema concerns belong to the caller.
//!
//! This is an unofficial client. It is not affiliated with or endorsed by
//! Trade Republic Bank GmbH, and the upstream API may change without notice.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod http;
pub mod websocket;
