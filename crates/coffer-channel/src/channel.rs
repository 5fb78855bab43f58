//! Channel state and message encryption.

use base64::Engine;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use coffer_crypto::aes::{self, AesOptions};
use coffer_crypto::ecdh::derive_shared_secret;
use coffer_types::SecureChannelError;

use crate::wire::{PairingCode, PairingResponse};

// ---------------------------------------------------------------------------
// PairingChannel
// ---------------------------------------------------------------------------

/// One pairing attempt's worth of channel state.
///
/// The device key is generated when the channel opens and dies with
/// it. Opening a new channel for a retry gives the peer no material
/// from the failed attempt.
pub struct PairingChannel {
    channel_id: Uuid,
    device_key: SecretKey,
    remote_public_key: PublicKey,
}

// PairingChannel does not implement Clone/Debug to prevent leakage.

impl PairingChannel {
    /// Opens a channel against the peer described by a scanned QR
    /// code, generating a fresh device key.
    pub fn open(code: &PairingCode) -> Result<Self, SecureChannelError> {
        let remote_public_key = code.public_key()?;
        let device_key = SecretKey::random(&mut rand::rngs::OsRng);
        debug!(channel_id = %code.channel_id, "opened pairing channel");

        Ok(Self {
            channel_id: code.channel_id,
            device_key,
            remote_public_key,
        })
    }

    /// The relay channel this pairing runs over.
    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    /// Encrypts a payload into a relay-ready response envelope.
    pub fn build_message<T: Serialize>(
        &self,
        payload: &T,
        success: bool,
    ) -> Result<PairingResponse, SecureChannelError> {
        build_message(
            payload,
            self.channel_id,
            success,
            &self.remote_public_key,
            &self.device_key,
        )
    }

    /// Decrypts an incoming `base64(iv ‖ ciphertext)` message.
    pub fn decrypt_message<T: DeserializeOwned>(
        &self,
        ciphertext: &str,
    ) -> Result<T, SecureChannelError> {
        decrypt_message(ciphertext, &self.remote_public_key, &self.device_key)
    }
}

// ---------------------------------------------------------------------------
// Message codec
// ---------------------------------------------------------------------------

/// Encrypts a payload for the peer and wraps it in a response
/// envelope carrying our compressed public key.
pub fn build_message<T: Serialize>(
    payload: &T,
    channel_id: Uuid,
    success: bool,
    remote_public: &PublicKey,
    device_key: &SecretKey,
) -> Result<PairingResponse, SecureChannelError> {
    let plaintext =
        serde_json::to_vec(payload).map_err(|err| SecureChannelError::MalformedPayload {
            reason: format!("payload serialization failed: {err}"),
        })?;

    let shared = derive_shared_secret(device_key, remote_public)?;

    let mut iv = [0u8; aes::BLOCK_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    let ciphertext = aes::encrypt(&plaintext, shared.as_bytes(), &iv, AesOptions::default())
        .map_err(|_| SecureChannelError::MessageEncryptionFailed)?;

    let mut blob = Vec::with_capacity(iv.len() + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);

    let pubkey = hex::encode(device_key.public_key().to_encoded_point(true).as_bytes());

    Ok(PairingResponse {
        channel_id,
        pubkey,
        success,
        message: base64::engine::general_purpose::STANDARD.encode(blob),
    })
}

/// Decrypts a `base64(iv ‖ ciphertext)` message from the peer.
///
/// Decode, decrypt, and length failures all collapse into
/// [`SecureChannelError::MessageDecryptionFailed`]; a structurally
/// valid plaintext that fails to parse is `MalformedPayload`.
pub fn decrypt_message<T: DeserializeOwned>(
    ciphertext: &str,
    remote_public: &PublicKey,
    device_key: &SecretKey,
) -> Result<T, SecureChannelError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(ciphertext.trim())
        .map_err(|_| SecureChannelError::MessageDecryptionFailed)?;
    if raw.len() <= aes::BLOCK_LEN {
        return Err(SecureChannelError::MessageDecryptionFailed);
    }

    let (iv, body) = raw.split_at(aes::BLOCK_LEN);
    let mut iv_block = [0u8; aes::BLOCK_LEN];
    iv_block.copy_from_slice(iv);

    let shared = derive_shared_secret(device_key, remote_public)?;
    let plaintext = aes::decrypt(body, shared.as_bytes(), &iv_block, AesOptions::default())
        .map_err(|_| SecureChannelError::MessageDecryptionFailed)?;

    serde_json::from_slice(&plaintext).map_err(|err| SecureChannelError::MalformedPayload {
        reason: format!("decrypted payload failed to parse: {err}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
