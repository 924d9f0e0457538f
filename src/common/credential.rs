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

//! Device credential storage and request signing for Trade Republic.
//!
//! Signed endpoints (the device login flow) authenticate with an ECDSA P-256
//! key paired to the account. The signature covers the UTF-8 bytes of
//! `"{timestamp_ms}.{json_payload}"` hashed with SHA-512; the raw 64-byte
//! r||s output is converted to ASN.1 DER and base64-encoded before it is
//! placed on the `X-Zeta-Signature` header.

use std::{
    fmt::Debug,
    time::{SystemTime, UNIX_EPOCH},
};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use p256::ecdsa::{Signature, SigningKey, signature::hazmat::PrehashSigner};
use rand_core::OsRng;
use sha2::{Digest, Sha512};
use thiserror::Error;

/// Errors raised while creating or using a [`Credential`].
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// The provided private key material is not a valid P-256 scalar.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// The payload could not be serialized for signing.
    #[error("Failed to serialize payload: {0}")]
    Serialization(String),
    /// The ECDSA signing operation failed.
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A signed request payload: the timestamp that was covered by the signature
/// and the base64-encoded DER signature itself.
#[derive(Debug, Clone)]
pub struct SignedPayload {
    /// Wall-clock milliseconds covered by the signature.
    pub timestamp: u64,
    /// Base64 of the DER-encoded ECDSA signature.
    pub signature: String,
}

/// ECDSA P-256 device credential for signed Trade Republic requests.
///
/// The key is generated locally during device pairing; its public half is
/// uploaded to the backend, after which signed requests are accepted.
#[derive(Clone)]
pub struct Credential {
    signing_key: SigningKey,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Credential))
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Generates a fresh random P-256 credential.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Creates a [`Credential`] from a hex-encoded 32-byte private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the hex is malformed or not a valid P-256 scalar.
    pub fn from_hex(private_key_hex: &str) -> Result<Self, CredentialError> {
        let key_bytes = hex::decode(private_key_hex.trim_start_matches("0x"))
            .map_err(|e| CredentialError::InvalidPrivateKey(e.to_string()))?;
        let signing_key = SigningKey::from_slice(&key_bytes)
            .map_err(|e| CredentialError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Returns the private key as lowercase hex, for caller-side persistence.
    ///
    /// # Safety
    ///
    /// The returned string is secret material and must never be logged.
    #[must_use]
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Returns the public key as base64 of the uncompressed SEC1 point.
    ///
    /// This is the representation uploaded during device pairing.
    #[must_use]
    pub fn public_key_base64(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        BASE64.encode(point.as_bytes())
    }

    /// Signs `payload` with the current wall-clock timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn sign_payload(&self, payload: &serde_json::Value) -> Result<SignedPayload, CredentialError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.sign_payload_at(timestamp, payload)
    }

    /// Signs `payload` with an explicit timestamp (milliseconds).
    ///
    /// The signed message is the UTF-8 bytes of
    /// `"{timestamp}.{compact JSON of payload}"`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn sign_payload_at(
        &self,
        timestamp: u64,
        payload: &serde_json::Value,
    ) -> Result<SignedPayload, CredentialError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| CredentialError::Serialization(e.to_string()))?;
        let message = format!("{timestamp}.{json}");
        let digest = Sha512::digest(message.as_bytes());
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|e| CredentialError::Signing(e.to_string()))?;
        let der = p1363_to_der(&signature.to_bytes());
        Ok(SignedPayload {
            timestamp,
            signature: BASE64.encode(der),
        })
    }
}

/// Converts a raw P1363 (fixed-width r||s) ECDSA signature to ASN.1 DER
/// `SEQUENCE { INTEGER r, INTEGER s }`.
///
/// Leading zero octets of each scalar are stripped to the minimal
/// representation, and a single `0x00` is re-inserted whenever the high bit
/// of the most significant retained octet is set, keeping the integer
/// non-negative. Expects the 64-byte r||s concatenation produced by P-256.
#[must_use]
pub fn p1363_to_der(raw: &[u8]) -> Vec<u8> {
    let (r, s) = raw.split_at(raw.len() / 2);
    let r = der_integer(r);
    let s = der_integer(s);
    let mut out = Vec::with_capacity(2 + r.len() + s.len());
    out.push(0x30);
    out.push((r.len() + s.len()) as u8);
    out.extend_from_slice(&r);
    out.extend_from_slice(&s);
    out
}

fn der_integer(scalar: &[u8]) -> Vec<u8> {
    let mut bytes = scalar;
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes = &bytes[1..];
    }
    if bytes.is_empty() {
        return vec![0x02, 0x01, 0x00];
    }
    let needs_pad = bytes[0] & 0x80 != 0;
    let mut out = Vec::with_capacity(2 + bytes.len() + 1);
    out.push(0x02);
    out.push((bytes.len() + usize::from(needs_pad)) as u8);
    if needs_pad {
        out.push(0x00);
    }
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use p256::ecdsa::signature::hazmat::PrehashVerifier;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    // Valid test private key (value 1 - simplest valid P-256 scalar)
    const TEST_PRIVATE_KEY: &str =
        "0000000000000000000000000000000000000000000000000000000000000001";

    #[rstest]
    fn test_from_hex_roundtrip() {
        let credential = Credential::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(credential.private_key_hex(), TEST_PRIVATE_KEY);
    }

    #[rstest]
    fn test_from_hex_with_0x_prefix() {
        let key_with_prefix = format!("0x{TEST_PRIVATE_KEY}");
        let credential = Credential::from_hex(&key_with_prefix).unwrap();
        assert_eq!(credential.private_key_hex(), TEST_PRIVATE_KEY);
    }

    #[rstest]
    fn test_from_hex_rejects_garbage() {
        assert!(Credential::from_hex("not hex").is_err());
        // All-zero scalar is not a valid private key
        let zeros = "00".repeat(32);
        assert!(Credential::from_hex(&zeros).is_err());
    }

    #[rstest]
    fn test_public_key_is_uncompressed_point() {
        let credential = Credential::from_hex(TEST_PRIVATE_KEY).unwrap();
        let decoded = BASE64.decode(credential.public_key_base64()).unwrap();
        // 0x04 tag + 32-byte x + 32-byte y
        assert_eq!(decoded.len(), 65);
        assert_eq!(decoded[0], 0x04);
    }

    #[rstest]
    fn test_sign_payload_at_is_verifiable() {
        let credential = Credential::from_hex(TEST_PRIVATE_KEY).unwrap();
        let payload = json!({"phoneNumber": "+491701234567", "pin": "1234"});
        let signed = credential.sign_payload_at(1_700_000_000_000, &payload).unwrap();

        assert_eq!(signed.timestamp, 1_700_000_000_000);

        let message = format!("1700000000000.{}", serde_json::to_string(&payload).unwrap());
        let digest = Sha512::digest(message.as_bytes());
        let der = BASE64.decode(&signed.signature).unwrap();
        let signature = Signature::from_der(&der).unwrap();

        credential
            .signing_key
            .verifying_key()
            .verify_prehash(&digest, &signature)
            .expect("signature should verify");
    }

    #[rstest]
    fn test_p1363_to_der_matches_reference_encoder() {
        let credential = Credential::generate();
        let digest = Sha512::digest(b"reference encoding check");
        let signature: Signature = credential.signing_key.sign_prehash(&digest).unwrap();

        let ours = p1363_to_der(&signature.to_bytes());
        let reference = signature.to_der();
        assert_eq!(ours, reference.as_bytes());
    }

    #[rstest]
    fn test_p1363_to_der_strips_leading_zeros() {
        let mut raw = [0u8; 64];
        raw[31] = 0x01; // r = 1
        // s = 0
        let der = p1363_to_der(&raw);
        assert_eq!(der, vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00]);
    }

    #[rstest]
    fn test_p1363_to_der_pads_high_bit() {
        let mut raw = [0u8; 64];
        raw[0] = 0x80; // r starts with high bit set
        raw[63] = 0x01; // s = 1
        let der = p1363_to_der(&raw);
        // r: INTEGER of 33 bytes (0x00 pad + 32 payload)
        assert_eq!(&der[..4], &[0x30, 0x26, 0x02, 0x21]);
        assert_eq!(der[4], 0x00);
        assert_eq!(der[5], 0x80);
        // s: INTEGER 01 at the tail
        assert_eq!(&der[der.len() - 3..], &[0x02, 0x01, 0x01]);
    }

    #[rstest]
    fn test_signatures_differ_by_timestamp() {
        let credential = Credential::from_hex(TEST_PRIVATE_KEY).unwrap();
        let payload = json!({});
        let a = credential.sign_payload_at(1, &payload).unwrap();
        let b = credential.sign_payload_at(2, &payload).unwrap();
        assert_ne!(a.signature, b.signature);
    }

    #[rstest]
    fn test_debug_does_not_leak_key() {
        let credential = Credential::from_hex(TEST_PRIVATE_KEY).unwrap();
        let debug_string = format!("{credential:?}");
        assert!(debug_string.contains("<redacted>"));
        assert!(!debug_string.contains(TEST_PRIVATE_KEY));
    }
}
