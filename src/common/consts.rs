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

//! Core constants shared across the Trade Republic client components.

// HTTP endpoint
pub const TRADE_REPUBLIC_HTTP_URL: &str = "https://api.traderepublic.com";

// Streaming endpoint
pub const TRADE_REPUBLIC_WS_URL: &str = "wss://api.traderepublic.com";

/// Origin sent on REST requests and the WebSocket upgrade.
pub const TRADE_REPUBLIC_ORIGIN: &str = "https://app.traderepublic.com";

// Handshake identity, mirroring the web trading frontend
pub const TRADE_REPUBLIC_PLATFORM_ID: &str = "webtrading";
pub const TRADE_REPUBLIC_CLIENT_ID: &str = "app.traderepublic.com";
pub const TRADE_REPUBLIC_CLIENT_VERSION: &str = "3.151.3";

/// Subscription identifier reserved for the `connect` handshake frame.
///
/// The data id allocator never hands this value out.
pub const RESERVED_CONNECT_ID: u64 = 31;

/// Locale used when no language is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Signed request header carrying the signing timestamp (milliseconds).
pub const HEADER_ZETA_TIMESTAMP: &str = "X-Zeta-Timestamp";

/// Signed request header carrying the base64 DER signature.
pub const HEADER_ZETA_SIGNATURE: &str = "X-Zeta-Signature";

pub const TRADE_REPUBLIC_USER_AGENT: &str = concat!("traderepublic-rs/", env!("CARGO_PKG_VERSION"));
