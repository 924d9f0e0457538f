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

//! Configuration structures for the Trade Republic client.

use crate::common::consts::{DEFAULT_LOCALE, TRADE_REPUBLIC_HTTP_URL, TRADE_REPUBLIC_WS_URL};

/// Configuration for [`TradeRepublicClient`](crate::client::TradeRepublicClient).
#[derive(Clone, Debug)]
pub struct TradeRepublicConfig {
    /// Language tag used for `Accept-Language` and the stream handshake locale.
    pub language: Option<String>,
    /// Optional override for the REST base URL.
    pub base_url_http: Option<String>,
    /// Optional override for the WebSocket URL.
    pub base_url_ws: Option<String>,
    /// Optional REST timeout in seconds.
    pub http_timeout_secs: Option<u64>,
}

impl Default for TradeRepublicConfig {
    fn default() -> Self {
        Self {
            language: None,
            base_url_http: None,
            base_url_ws: None,
            http_timeout_secs: Some(30),
        }
    }
}

impl TradeRepublicConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the REST base URL, considering overrides.
    #[must_use]
    pub fn http_base_url(&self) -> String {
        self.base_url_http
            .clone()
            .unwrap_or_else(|| TRADE_REPUBLIC_HTTP_URL.to_string())
    }

    /// Returns the WebSocket URL, considering overrides.
    #[must_use]
    pub fn ws_url(&self) -> String {
        self.base_url_ws
            .clone()
            .unwrap_or_else(|| TRADE_REPUBLIC_WS_URL.to_string())
    }

    /// Returns the configured locale, falling back to the default.
    #[must_use]
    pub fn locale(&self) -> String {
        self.language
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_defaults() {
        let config = TradeRepublicConfig::new();
        assert_eq!(config.http_base_url(), TRADE_REPUBLIC_HTTP_URL);
        assert_eq!(config.ws_url(), TRADE_REPUBLIC_WS_URL);
        assert_eq!(config.locale(), DEFAULT_LOCALE);
    }

    #[rstest]
    fn test_overrides() {
        let config = TradeRepublicConfig {
            language: Some("de".to_string()),
            base_url_http: Some("http://127.0.0.1:8080".to_string()),
            base_url_ws: Some("ws://127.0.0.1:8081".to_string()),
            http_timeout_secs: Some(5),
        };
        assert_eq!(config.http_base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.ws_url(), "ws://127.0.0.1:8081");
        assert_eq!(config.locale(), "de");
    }
}
