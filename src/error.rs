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

//! Top-level error type for the Trade Republic client facade.

use thiserror::Error;

use crate::{http::error::TradeRepublicHttpError, websocket::error::TradeRepublicWsError};

/// Errors surfaced by [`TradeRepublicClient`](crate::client::TradeRepublicClient).
#[derive(Debug, Clone, Error)]
pub enum TradeRepublicError {
    /// An operation was called in the wrong session state (misuse).
    ///
    /// Raised synchronously, before any I/O.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// An HTTP-layer failure.
    #[error(transparent)]
    Http(#[from] TradeRepublicHttpError),
    /// A WebSocket-layer failure.
    #[error(transparent)]
    Ws(#[from] TradeRepublicWsError),
}
