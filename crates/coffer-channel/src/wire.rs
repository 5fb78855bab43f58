//! Pairing wire models.
//!
//! Field names match the browser peer's JSON exactly; the relay passes
//! these through opaquely.

use k256::PublicKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coffer_types::SecureChannelError;

/// The QR-code payload scanned to start a pairing attempt.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PairingCode {
    /// Relay channel to respond on.
    #[serde(rename = "channelId")]
    pub channel_id: Uuid,
    /// Peer's compressed secp256k1 public key, hex-encoded.
    pub pubkey: String,
}

impl PairingCode {
    /// Parses the peer's public key from its hex form.
    pub fn public_key(&self) -> Result<PublicKey, SecureChannelError> {
        let raw = hex::decode(&self.pubkey).map_err(|err| {
            SecureChannelError::MalformedPayload {
                reason: format!("pubkey is not valid hex: {err}"),
            }
        })?;
        PublicKey::from_sec1_bytes(&raw).map_err(|_| SecureChannelError::MalformedPayload {
            reason: "pubkey is not a valid secp256k1 point".into(),
        })
    }
}

/// First encrypted message: announces which wallet is pairing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PairingHandshake {
    /// Wallet identifier.
    pub guid: String,
}

/// Credential hand-off completing the pairing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginMessage {
    /// Wallet identifier.
    pub guid: String,
    /// The wallet password.
    pub password: String,
    /// Server-issued shared key.
    #[serde(rename = "sharedKey")]
    pub shared_key: String,
}

// LoginMessage's Debug redacts the secrets to prevent leakage.
impl core::fmt::Debug for LoginMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginMessage")
            .field("guid", &self.guid)
            .field("password", &"<redacted>")
            .field("shared_key", &"<redacted>")
            .finish()
    }
}

/// Acknowledgement with no body.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmptyResponse {}

/// Envelope posted back to the relay.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PairingResponse {
    /// Relay channel this response belongs to.
    #[serde(rename = "channelId")]
    pub channel_id: Uuid,
    /// Sender's compressed secp256k1 public key, hex-encoded, so the
    /// peer can re-derive the shared secret.
    pub pubkey: String,
    /// Whether the sender considers the exchange successful.
    pub success: bool,
    /// Encrypted payload: `base64(iv ‖ ciphertext)`.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
