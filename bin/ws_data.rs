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

//! Example binary demonstrating Trade Republic streaming subscriptions.
//!
//! Adopts an existing session (interactive OTP entry is out of scope here)
//! and subscribes to the ticker of one instrument.
//!
//! # Environment Variables
//!
//! - `TRADE_REPUBLIC_COOKIES`: session cookies as `name=value` pairs joined
//!   with `;` (obtain them from a logged-in web session)
//! - `TRADE_REPUBLIC_LOCALE`: optional language tag (default `en`)
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin traderepublic-ws-data -- US0378331005.LSX
//! ```

use serde_json::json;
use tokio::{pin, signal};
use tracing::level_filters::LevelFilter;
use traderepublic::{client::TradeRepublicClient, websocket::SubscriptionEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    let cookies: Vec<String> = std::env::var("TRADE_REPUBLIC_COOKIES")?
        .split(';')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    let locale = std::env::var("TRADE_REPUBLIC_LOCALE").ok();
    let instrument = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "US0378331005.LSX".to_string());

    let mut client = TradeRepublicClient::new(locale.as_deref())?;
    client.login_with_cookies(cookies)?;

    let mut ws = client.websocket()?;
    tracing::info!("Connecting to Trade Republic stream...");
    ws.connect().await?;

    let mut subscription = ws.subscribe(json!({"type": "ticker", "id": instrument}))?;
    tracing::info!(
        "Subscribed to ticker for {instrument} with id {}",
        subscription.id()
    );

    // Create a future that completes on CTRL+C
    let sigint = signal::ctrl_c();
    pin!(sigint);

    tracing::info!("Listening for updates... Press Ctrl+C to exit");

    loop {
        tokio::select! {
            event = subscription.next() => match event {
                Some(SubscriptionEvent::Update(document)) => tracing::info!("{document}"),
                Some(SubscriptionEvent::Closed) => {
                    tracing::info!("Subscription closed by server");
                    break;
                }
                None => {
                    tracing::info!("Stream ended");
                    break;
                }
            },
            _ = &mut sigint => {
                tracing::info!("Received SIGINT, closing connection...");
                ws.disconnect().await;
                break;
            }
        }
    }

    Ok(())
}
