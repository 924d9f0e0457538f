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

//! Request and response structures for the Trade Republic REST API.
//!
//! Only the authentication flows have typed models; the read-only account
//! endpoints return opaque [`serde_json::Value`] documents by design.

use serde::{Deserialize, Serialize};

/// Body of the login initiation requests (web login and device flows).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone_number: String,
    pub pin: String,
}

impl LoginRequest {
    /// Creates a new [`LoginRequest`].
    #[must_use]
    pub fn new(phone_number: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            pin: pin.into(),
        }
    }
}

/// Response of `POST /api/v1/auth/web/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebLoginResponse {
    /// Identifier of the pending login process, echoed in the OTP URL.
    pub process_id: String,
    /// Seconds until a new OTP may be requested.
    #[serde(default)]
    pub countdown_in_seconds: Option<u64>,
    /// Channel the second factor was delivered on (e.g. `"SMS"` or `"APP"`).
    #[serde(rename = "2fa", default)]
    pub two_factor_channel: Option<String>,
}

/// Response of `POST /api/v1/auth/account/reset/device`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResetResponse {
    /// Identifier of the pending pairing process.
    pub process_id: String,
}

/// Body of `POST /api/v1/auth/account/reset/device/{processId}/key`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKeyRequest {
    /// The OTP delivered for the pairing process.
    pub code: String,
    /// Base64 of the uncompressed SEC1 public key being paired.
    pub device_key: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn test_login_request_serializes_camel_case() {
        let request = LoginRequest::new("+491701234567", "1234");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"phoneNumber": "+491701234567", "pin": "1234"})
        );
    }

    #[rstest]
    fn test_web_login_response_deserializes() {
        let response: WebLoginResponse = serde_json::from_value(json!({
            "processId": "proc-123",
            "countdownInSeconds": 30,
            "2fa": "SMS"
        }))
        .unwrap();

        assert_eq!(response.process_id, "proc-123");
        assert_eq!(response.countdown_in_seconds, Some(30));
        assert_eq!(response.two_factor_channel.as_deref(), Some("SMS"));
    }

    #[rstest]
    fn test_web_login_response_tolerates_missing_optionals() {
        let response: WebLoginResponse =
            serde_json::from_value(json!({"processId": "proc-123"})).unwrap();
        assert_eq!(response.countdown_in_seconds, None);
        assert_eq!(response.two_factor_channel, None);
    }
}
