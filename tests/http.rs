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

//! Integration tests for the Trade Republic HTTP client and login flows using
//! a mock Axum server.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{
        HeaderMap, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use p256::ecdsa::{Signature, VerifyingKey, signature::hazmat::PrehashVerifier};
use serde_json::{Value, json};
use sha2::{Digest, Sha512};
use traderepublic::{
    client::TradeRepublicClient,
    common::credential::Credential,
    config::TradeRepublicConfig,
    error::TradeRepublicError,
    http::error::TradeRepublicHttpError,
};

// ------------------------------------------------------------------------------------------------
// Test Server
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Default)]
struct TestServerState {
    login_body: Arc<Mutex<Option<Value>>>,
    account_cookie_header: Arc<Mutex<Option<String>>>,
    signed_request: Arc<Mutex<Option<(u64, String, Value)>>>,
}

fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn web_login(
    State(state): State<Arc<TestServerState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    *state.login_body.lock().unwrap() = Some(body);
    (
        AppendHeaders([
            (SET_COOKIE, "tr_login=abc; Path=/; HttpOnly"),
            (
                SET_COOKIE,
                "tr_track=1; expires=Wed, 21 Oct 2026 07:28:00 GMT, tr_extra=2; path=/",
            ),
        ]),
        Json(json!({
            "processId": "proc-1",
            "countdownInSeconds": 30,
            "2fa": "SMS"
        })),
    )
}

async fn web_login_otp(
    Path((process_id, otp)): Path<(String, String)>,
    headers: HeaderMap,
) -> axum::response::Response {
    if process_id != "proc-1" {
        return (StatusCode::NOT_FOUND, "unknown process").into_response();
    }
    // The initiation cookies must be carried on the completion call
    if cookie_header(&headers) != "tr_login=abc; tr_track=1; tr_extra=2" {
        return (StatusCode::BAD_REQUEST, "missing login cookies").into_response();
    }
    if otp != "1234" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": [{"errorCode": "OTP_INVALID"}]})),
        )
            .into_response();
    }
    (
        AppendHeaders([
            (SET_COOKIE, "tr_session=xyz; Path=/; HttpOnly"),
            (
                SET_COOKIE,
                "tr_refresh=r1; expires=Wed, 21 Oct 2026 07:28:00 GMT",
            ),
        ]),
        Json(json!({})),
    )
        .into_response()
}

async fn device_login(
    State(state): State<Arc<TestServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let timestamp = headers
        .get("X-Zeta-Timestamp")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let signature = headers
        .get("X-Zeta-Signature")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return (StatusCode::UNAUTHORIZED, "missing signature headers").into_response();
    };
    *state.signed_request.lock().unwrap() = Some((timestamp, signature, body));
    (
        AppendHeaders([(SET_COOKIE, "tr_session=signed; Path=/")]),
        Json(json!({})),
    )
        .into_response()
}

async fn account(
    State(state): State<Arc<TestServerState>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let cookie = cookie_header(&headers);
    *state.account_cookie_header.lock().unwrap() = Some(cookie.clone());
    if !cookie.contains("tr_session=") {
        return (StatusCode::UNAUTHORIZED, "no session").into_response();
    }
    Json(json!({"name": "Jane Doe", "accountNumber": "123456"})).into_response()
}

async fn trending_stocks() -> Json<Value> {
    Json(json!({"results": [{"isin": "US0378331005"}, {"isin": "US88160R1014"}]}))
}

async fn documents() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"errors": [{"errorCode": "AUTHENTICATION_ERROR"}]})),
    )
        .into_response()
}

async fn start_http_server() -> (SocketAddr, Arc<TestServerState>) {
    let state = Arc::new(TestServerState::default());
    let router = Router::new()
        .route("/api/v1/auth/web/login", post(web_login))
        .route("/api/v1/auth/web/login/{process_id}/{otp}", post(web_login_otp))
        .route("/api/v1/auth/login", post(device_login))
        .route("/api/v2/auth/account", get(account))
        .route("/api/v1/ranking/trendingStocks", get(trending_stocks))
        .route("/api/v1/documents/all", get(documents))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });
    (addr, state)
}

fn client_for(addr: SocketAddr) -> TradeRepublicClient {
    TradeRepublicClient::with_config(TradeRepublicConfig {
        language: Some("en".to_string()),
        base_url_http: Some(format!("http://{addr}")),
        base_url_ws: None,
        http_timeout_secs: Some(5),
    })
    .unwrap()
}

// ------------------------------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------------------------------

#[tokio::test]
async fn test_full_web_login_flow() {
    let (addr, state) = start_http_server().await;
    let mut client = client_for(addr);

    let response = client.initiate_login("+491701234567", "1234").await.unwrap();
    assert_eq!(response.process_id, "proc-1");
    assert_eq!(response.countdown_in_seconds, Some(30));
    assert_eq!(response.two_factor_channel.as_deref(), Some("SMS"));
    assert!(!client.is_authenticated());

    let body = state.login_body.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({"phoneNumber": "+491701234567", "pin": "1234"}));

    client.complete_login("1234").await.unwrap();
    assert!(client.is_authenticated());
    assert_eq!(
        client.session_cookies().unwrap(),
        &["tr_session=xyz".to_string(), "tr_refresh=r1".to_string()]
    );

    let account = client.account().await.unwrap();
    assert_eq!(account["name"], "Jane Doe");

    // The session cookies were joined into a single Cookie header
    let cookie = state.account_cookie_header.lock().unwrap().clone().unwrap();
    assert_eq!(cookie, "tr_session=xyz; tr_refresh=r1");
}

#[tokio::test]
async fn test_wrong_otp_surfaces_status_and_body() {
    let (addr, _state) = start_http_server().await;
    let mut client = client_for(addr);

    client.initiate_login("+491701234567", "1234").await.unwrap();
    let err = client.complete_login("9999").await.unwrap_err();

    match err {
        TradeRepublicError::Http(TradeRepublicHttpError::UnexpectedStatus {
            status,
            status_text,
            body,
        }) => {
            assert_eq!(status, 401);
            assert_eq!(status_text, "Unauthorized");
            assert!(body.contains("OTP_INVALID"));
        }
        other => panic!("expected unexpected-status error, got {other:?}"),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_device_login_sends_verifiable_signature() {
    let (addr, state) = start_http_server().await;
    let credential = Credential::generate();
    let public_key = credential.public_key_base64();
    let mut client = client_for(addr).with_device_credential(credential);

    client.device_login("+491701234567", "1234").await.unwrap();
    assert!(client.is_authenticated());
    assert_eq!(
        client.session_cookies().unwrap(),
        &["tr_session=signed".to_string()]
    );

    let (timestamp, signature, body) = state.signed_request.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({"phoneNumber": "+491701234567", "pin": "1234"}));

    // The signature covers "{timestamp}.{json}" hashed with SHA-512 and
    // verifies against the uploaded public key
    let message = format!("{timestamp}.{}", serde_json::to_string(&body).unwrap());
    let digest = Sha512::digest(message.as_bytes());
    let der = BASE64.decode(signature).unwrap();
    let signature = Signature::from_der(&der).unwrap();
    let verifying_key =
        VerifyingKey::from_sec1_bytes(&BASE64.decode(public_key).unwrap()).unwrap();
    verifying_key
        .verify_prehash(&digest, &signature)
        .expect("signature should verify");
}

#[tokio::test]
async fn test_device_login_without_credential_fails_before_io() {
    let (addr, state) = start_http_server().await;
    let mut client = client_for(addr);

    let err = client.device_login("+491701234567", "1234").await.unwrap_err();
    assert!(matches!(
        err,
        TradeRepublicError::Http(TradeRepublicHttpError::MissingCredentials)
    ));
    assert!(state.signed_request.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_opaque_get_endpoint() {
    let (addr, _state) = start_http_server().await;
    let mut client = client_for(addr);
    client
        .login_with_cookies(vec!["tr_session=xyz".to_string()])
        .unwrap();

    let trending = client.trending_stocks().await.unwrap();
    assert_eq!(trending["results"][0]["isin"], "US0378331005");
}

#[tokio::test]
async fn test_authentication_expiry_is_reported_verbatim() {
    let (addr, _state) = start_http_server().await;
    let mut client = client_for(addr);
    client
        .login_with_cookies(vec!["tr_session=stale".to_string()])
        .unwrap();

    let err = client.documents().await.unwrap_err();
    match err {
        TradeRepublicError::Http(TradeRepublicHttpError::UnexpectedStatus { status, body, .. }) => {
            assert_eq!(status, 401);
            assert!(body.contains("AUTHENTICATION_ERROR"));
        }
        other => panic!("expected unexpected-status error, got {other:?}"),
    }
    // The session is left untouched; re-login policy belongs to the caller
    assert!(client.is_authenticated());
}
