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

//! High-level Trade Republic client: session orchestration over the REST and
//! streaming surfaces.
//!
//! [`TradeRepublicClient`] drives the two-step web login (initiate with
//! phone/PIN, complete with the delivered OTP), holds the resulting session
//! cookies, and hands them to both the read-only REST wrappers and the
//! streaming client. The cookies are opaque: they are carried verbatim on
//! every authenticated request and on the stream upgrade.

use std::fmt::Debug;

use serde_json::Value;

use crate::{
    common::credential::Credential,
    config::TradeRepublicConfig,
    error::TradeRepublicError,
    http::{client::TradeRepublicHttpClient, models::WebLoginResponse},
    websocket::client::TradeRepublicWebSocketClient,
};

/// Session state of the login flow.
enum LoginState {
    LoggedOut,
    AwaitingOtp {
        process_id: String,
        cookies: Vec<String>,
    },
    Authenticated {
        cookies: Vec<String>,
    },
}

/// High-level client for the Trade Republic REST and streaming APIs.
pub struct TradeRepublicClient {
    config: TradeRepublicConfig,
    http: TradeRepublicHttpClient,
    state: LoginState,
}

impl Debug for TradeRepublicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            LoginState::LoggedOut => "LoggedOut",
            LoginState::AwaitingOtp { .. } => "AwaitingOtp",
            LoginState::Authenticated { .. } => "Authenticated",
        };
        f.debug_struct(stringify!(TradeRepublicClient))
            .field("state", &state)
            .field("http", &self.http)
            .finish()
    }
}

impl TradeRepublicClient {
    /// Creates a new [`TradeRepublicClient`] with an optional language tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(language: Option<&str>) -> Result<Self, TradeRepublicError> {
        Self::with_config(TradeRepublicConfig {
            language: language.map(ToString::to_string),
            ..TradeRepublicConfig::default()
        })
    }

    /// Creates a new [`TradeRepublicClient`] from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_config(config: TradeRepublicConfig) -> Result<Self, TradeRepublicError> {
        let http = TradeRepublicHttpClient::new(
            Some(config.http_base_url()),
            config.language.clone(),
            config.http_timeout_secs,
        )?;
        Ok(Self {
            config,
            http,
            state: LoginState::LoggedOut,
        })
    }

    /// Attaches a device credential for the signed login flow.
    #[must_use]
    pub fn with_device_credential(mut self, credential: Credential) -> Self {
        self.http.set_credential(credential);
        self
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn http(&self) -> &TradeRepublicHttpClient {
        &self.http
    }

    /// Returns whether a session is established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, LoginState::Authenticated { .. })
    }

    /// Returns the current session cookies, if authenticated.
    #[must_use]
    pub fn session_cookies(&self) -> Option<&[String]> {
        match &self.state {
            LoginState::Authenticated { cookies } => Some(cookies),
            _ => None,
        }
    }

    /// Starts the web login flow; an OTP is delivered out of band.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn initiate_login(
        &mut self,
        phone_number: &str,
        pin: &str,
    ) -> Result<WebLoginResponse, TradeRepublicError> {
        let (response, cookies) = self.http.post_web_login(phone_number, pin).await?;
        tracing::info!(
            process_id = %response.process_id,
            channel = response.two_factor_channel.as_deref().unwrap_or("unknown"),
            "Login initiated, awaiting OTP"
        );
        self.state = LoginState::AwaitingOtp {
            process_id: response.process_id.clone(),
            cookies,
        };
        Ok(response)
    }

    /// Completes the web login flow with the delivered OTP.
    ///
    /// # Errors
    ///
    /// Returns [`TradeRepublicError::InvalidState`], before any I/O, if
    /// `initiate_login` has not succeeded first or left no cookies; otherwise
    /// an error if the request fails.
    pub async fn complete_login(&mut self, otp: &str) -> Result<(), TradeRepublicError> {
        let LoginState::AwaitingOtp { process_id, cookies } = &self.state else {
            return Err(TradeRepublicError::InvalidState(
                "complete_login requires a pending login process; call initiate_login first"
                    .to_string(),
            ));
        };
        if cookies.is_empty() {
            return Err(TradeRepublicError::InvalidState(
                "No login cookies present; restart the login flow".to_string(),
            ));
        }

        let session = self.http.post_web_login_otp(process_id, otp, cookies).await?;
        tracing::info!("Login completed, session established");
        self.state = LoginState::Authenticated { cookies: session };
        Ok(())
    }

    /// Adopts a pre-existing session cookie sequence, bypassing the login flow.
    ///
    /// # Errors
    ///
    /// Returns an error if `cookies` is empty.
    pub fn login_with_cookies(&mut self, cookies: Vec<String>) -> Result<(), TradeRepublicError> {
        if cookies.is_empty() {
            return Err(TradeRepublicError::InvalidState(
                "Cookie sequence must not be empty".to_string(),
            ));
        }
        self.state = LoginState::Authenticated { cookies };
        Ok(())
    }

    /// Starts device pairing; returns the process id for the completion call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn initiate_device_pairing(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<String, TradeRepublicError> {
        let response = self.http.post_device_reset(phone_number, pin).await?;
        Ok(response.process_id)
    }

    /// Completes device pairing by uploading the credential's public key, then
    /// keeps the credential for subsequent signed logins.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn complete_device_pairing(
        &mut self,
        process_id: &str,
        otp: &str,
        credential: Credential,
    ) -> Result<(), TradeRepublicError> {
        self.http
            .post_device_reset_key(process_id, otp, &credential.public_key_base64())
            .await?;
        self.http.set_credential(credential);
        tracing::info!("Device paired");
        Ok(())
    }

    /// Logs in with the paired device credential (signed request).
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is configured, the request fails, or
    /// the response carries no session cookies.
    pub async fn device_login(
        &mut self,
        phone_number: &str,
        pin: &str,
    ) -> Result<(), TradeRepublicError> {
        let cookies = self.http.post_device_login(phone_number, pin).await?;
        if cookies.is_empty() {
            return Err(TradeRepublicError::InvalidState(
                "Login response carried no session cookies".to_string(),
            ));
        }
        self.state = LoginState::Authenticated { cookies };
        Ok(())
    }

    /// Discards the session.
    pub fn logout(&mut self) {
        self.state = LoginState::LoggedOut;
    }

    fn require_session(&self) -> Result<&[String], TradeRepublicError> {
        match &self.state {
            LoginState::Authenticated { cookies } => Ok(cookies),
            _ => Err(TradeRepublicError::InvalidState(
                "Not authenticated; log in first".to_string(),
            )),
        }
    }

    /// Fetches account information.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn account(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_account_info(cookies).await?)
    }

    /// Fetches the currently trending stocks.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn trending_stocks(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_trending_stocks(cookies).await?)
    }

    /// Fetches the configured tax exemption orders.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn tax_exemption_orders(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_tax_exemption_orders(cookies).await?)
    }

    /// Fetches the customer's personal details.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn personal_details(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_personal_details(cookies).await?)
    }

    /// Fetches the registered payment methods.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn payment_methods(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_payment_methods(cookies).await?)
    }

    /// Fetches the customer's tax residencies.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn tax_residencies(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_tax_residencies(cookies).await?)
    }

    /// Fetches general tax information for the account.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn tax_information(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_tax_information(cookies).await?)
    }

    /// Fetches the list of account documents.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the request fails.
    pub async fn documents(&self) -> Result<Value, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(self.http.get_documents(cookies).await?)
    }

    /// Creates a streaming client carrying this session's cookies.
    ///
    /// The returned client is independent: connect, subscribe, and disconnect
    /// on it directly.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated.
    pub fn websocket(&self) -> Result<TradeRepublicWebSocketClient, TradeRepublicError> {
        let cookies = self.require_session()?;
        Ok(TradeRepublicWebSocketClient::new(
            cookies.to_vec(),
            Some(self.config.locale()),
            Some(self.config.ws_url()),
        )?)
    }
}
