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

//! Provides the HTTP client integration for the Trade Republic REST API.
//!
//! The client is stateless with respect to the session: authentication flows
//! return the extracted cookies, and authenticated calls take the cookie
//! sequence explicitly. Session state lives in
//! [`TradeRepublicClient`](crate::client::TradeRepublicClient).

use std::{fmt::Debug, time::Duration};

use reqwest::{Method, header};
use serde_json::{Value, json};

use super::{
    error::TradeRepublicHttpError,
    models::{DeviceKeyRequest, DeviceResetResponse, LoginRequest, WebLoginResponse},
    parse::extract_cookies,
};
use crate::common::{
    consts::{
        HEADER_ZETA_SIGNATURE, HEADER_ZETA_TIMESTAMP, TRADE_REPUBLIC_HTTP_URL,
        TRADE_REPUBLIC_ORIGIN, TRADE_REPUBLIC_USER_AGENT,
    },
    credential::Credential,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the Trade Republic REST API.
pub struct TradeRepublicHttpClient {
    base_url: String,
    client: reqwest::Client,
    language: Option<String>,
    credential: Option<Credential>,
}

impl Debug for TradeRepublicHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TradeRepublicHttpClient))
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("has_credential", &self.credential.is_some())
            .finish()
    }
}

impl TradeRepublicHttpClient {
    /// Creates a new [`TradeRepublicHttpClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        base_url: Option<String>,
        language: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, TradeRepublicHttpError> {
        let client = reqwest::Client::builder()
            .user_agent(TRADE_REPUBLIC_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| {
                TradeRepublicHttpError::NetworkError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: base_url.unwrap_or_else(|| TRADE_REPUBLIC_HTTP_URL.to_string()),
            client,
            language,
            credential: None,
        })
    }

    /// Attaches a device credential for signed endpoints.
    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets or replaces the device credential.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns whether a device credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    async fn send_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        cookies: Option<&[String]>,
        signed: bool,
    ) -> Result<reqwest::Response, TradeRepublicHttpError> {
        let url = format!("{}{path}", self.base_url);

        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, TRADE_REPUBLIC_ORIGIN);

        if let Some(language) = &self.language {
            request = request.header(header::ACCEPT_LANGUAGE, language);
        }

        if let Some(cookies) = cookies
            && !cookies.is_empty()
        {
            request = request.header(header::COOKIE, cookies.join("; "));
        }

        if signed {
            let credential = self
                .credential
                .as_ref()
                .ok_or(TradeRepublicHttpError::MissingCredentials)?;
            let payload = body.cloned().unwrap_or_else(|| json!({}));
            let signed_payload = credential.sign_payload(&payload)?;
            request = request
                .header(HEADER_ZETA_TIMESTAMP, signed_payload.timestamp.to_string())
                .header(HEADER_ZETA_SIGNATURE, signed_payload.signature);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradeRepublicHttpError::UnexpectedStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json(
        &self,
        path: &str,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        let response = self
            .send_request(Method::GET, path, None, Some(cookies), false)
            .await?;
        Ok(response.json().await?)
    }

    /// Initiates the web login flow for the given phone number and PIN.
    ///
    /// Returns the parsed response together with the initial cookies that must
    /// accompany the OTP completion call.
    ///
    /// # Endpoint
    /// `POST /api/v1/auth/web/login`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn post_web_login(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<(WebLoginResponse, Vec<String>), TradeRepublicHttpError> {
        let body = serde_json::to_value(LoginRequest::new(phone_number, pin))?;
        let response = self
            .send_request(Method::POST, "/api/v1/auth/web/login", Some(&body), None, false)
            .await?;

        let cookies = extract_cookies(response.headers());
        let parsed: WebLoginResponse = response.json().await?;
        Ok((parsed, cookies))
    }

    /// Completes the web login flow with the delivered OTP.
    ///
    /// Returns the session cookies established for the login.
    ///
    /// # Endpoint
    /// `POST /api/v1/auth/web/login/{processId}/{otp}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (a wrong OTP surfaces as a
    /// non-2xx status).
    pub async fn post_web_login_otp(
        &self,
        process_id: &str,
        otp: &str,
        cookies: &[String],
    ) -> Result<Vec<String>, TradeRepublicHttpError> {
        let path = format!("/api/v1/auth/web/login/{process_id}/{otp}");
        let body = json!({});
        let response = self
            .send_request(Method::POST, &path, Some(&body), Some(cookies), false)
            .await?;
        Ok(extract_cookies(response.headers()))
    }

    /// Initiates device pairing for the given phone number and PIN.
    ///
    /// # Endpoint
    /// `POST /api/v1/auth/account/reset/device`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn post_device_reset(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<DeviceResetResponse, TradeRepublicHttpError> {
        let body = serde_json::to_value(LoginRequest::new(phone_number, pin))?;
        let response = self
            .send_request(
                Method::POST,
                "/api/v1/auth/account/reset/device",
                Some(&body),
                None,
                false,
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Completes device pairing by uploading the public half of the device key.
    ///
    /// # Endpoint
    /// `POST /api/v1/auth/account/reset/device/{processId}/key`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post_device_reset_key(
        &self,
        process_id: &str,
        otp: &str,
        device_key_base64: &str,
    ) -> Result<(), TradeRepublicHttpError> {
        let path = format!("/api/v1/auth/account/reset/device/{process_id}/key");
        let body = serde_json::to_value(DeviceKeyRequest {
            code: otp.to_string(),
            device_key: device_key_base64.to_string(),
        })?;
        self.send_request(Method::POST, &path, Some(&body), None, false)
            .await?;
        Ok(())
    }

    /// Logs in with a paired device key, signing the payload.
    ///
    /// Returns the session cookies established for the login.
    ///
    /// # Endpoint
    /// `POST /api/v1/auth/login` (signed with `X-Zeta-Timestamp` /
    /// `X-Zeta-Signature`)
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is configured or the request fails.
    pub async fn post_device_login(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<Vec<String>, TradeRepublicHttpError> {
        let body = serde_json::to_value(LoginRequest::new(phone_number, pin))?;
        let response = self
            .send_request(Method::POST, "/api/v1/auth/login", Some(&body), None, true)
            .await?;
        Ok(extract_cookies(response.headers()))
    }

    /// Fetches account information for the authenticated session.
    ///
    /// # Endpoint
    /// `GET /api/v2/auth/account`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_account_info(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v2/auth/account", cookies).await
    }

    /// Fetches the currently trending stocks.
    ///
    /// # Endpoint
    /// `GET /api/v1/ranking/trendingStocks`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_trending_stocks(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v1/ranking/trendingStocks", cookies).await
    }

    /// Fetches the configured tax exemption orders.
    ///
    /// # Endpoint
    /// `GET /api/v1/taxes/exemptionorders`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_tax_exemption_orders(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v1/taxes/exemptionorders", cookies).await
    }

    /// Fetches the customer's personal details.
    ///
    /// # Endpoint
    /// `GET /api/v1/customer/personal-details`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_personal_details(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v1/customer/personal-details", cookies).await
    }

    /// Fetches the registered payment methods.
    ///
    /// # Endpoint
    /// `GET /api/v2/payment/methods`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_payment_methods(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v2/payment/methods", cookies).await
    }

    /// Fetches the customer's tax residencies.
    ///
    /// # Endpoint
    /// `GET /api/v1/country/taxresidency`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_tax_residencies(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v1/country/taxresidency", cookies).await
    }

    /// Fetches general tax information for the account.
    ///
    /// # Endpoint
    /// `GET /api/v1/taxes/information`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_tax_information(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v1/taxes/information", cookies).await
    }

    /// Fetches the list of account documents.
    ///
    /// # Endpoint
    /// `GET /api/v1/documents/all`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub async fn get_documents(
        &self,
        cookies: &[String],
    ) -> Result<Value, TradeRepublicHttpError> {
        self.get_json("/api/v1/documents/all", cookies).await
    }
}
