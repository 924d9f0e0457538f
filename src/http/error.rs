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

//! Error structures for the Trade Republic HTTP integration.

use thiserror::Error;

use crate::common::credential::CredentialError;

/// A typed error enumeration for the Trade Republic HTTP client.
#[derive(Debug, Clone, Error)]
pub enum TradeRepublicHttpError {
    /// A signed endpoint was called without a device credential configured.
    #[error("Missing device credential for signed request")]
    MissingCredentials,
    /// Failure while signing the request payload.
    #[error("Signing error: {0}")]
    Signing(String),
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Generic network error (connect, timeout, TLS).
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Parameter or state validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Any non-2xx HTTP response from Trade Republic.
    ///
    /// Authentication expiry surfaces here as a 401; retry and re-login
    /// policy belongs to the caller.
    #[error("Unexpected HTTP status {status} {status_text}: {body}")]
    UnexpectedStatus {
        status: u16,
        status_text: String,
        body: String,
    },
}

impl From<serde_json::Error> for TradeRepublicHttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

impl From<reqwest::Error> for TradeRepublicHttpError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}

impl From<CredentialError> for TradeRepublicHttpError {
    fn from(error: CredentialError) -> Self {
        Self::Signing(error.to_string())
    }
}
