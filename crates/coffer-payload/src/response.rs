//! Server wallet-payload response envelope.
//!
//! This is the JSON body returned when fetching a wallet by guid. The
//! `payload` field holds the wire envelope
//! ([`WalletPayloadWrapper`](crate::wrapper::WalletPayloadWrapper)) as
//! an embedded JSON string, or is absent while two-factor
//! authentication is pending.

use serde::{Deserialize, Serialize};

use coffer_types::PayloadDecodingError;

use crate::wrapper::WalletPayloadWrapper;

/// The wallet-fetch response body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalletPayloadResponse {
    /// Wallet identifier.
    pub guid: String,
    /// Two-factor authentication type in effect for this wallet.
    #[serde(rename = "authType", default)]
    pub auth_type: u32,
    /// User's preferred language code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Whether the client should re-upload derived public keys.
    #[serde(rename = "shouldSyncPubKeys", default)]
    pub should_sync_pub_keys: bool,
    /// Server timestamp of the stored payload, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    /// SHA-256 checksum the server recorded for the decrypted payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_checksum: Option<String>,
    /// Embedded wire envelope as a JSON string; absent while the
    /// second authentication factor is outstanding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl WalletPayloadResponse {
    /// Decodes the embedded wire envelope.
    ///
    /// # Errors
    ///
    /// [`PayloadDecodingError::MissingRawInput`] when the payload is
    /// withheld, or a parse error when it is present but malformed.
    pub fn wrapper(&self) -> Result<WalletPayloadWrapper, PayloadDecodingError> {
        WalletPayloadWrapper::decode(self.payload.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
