//! Versioned payload envelope.
//!
//! Two representations exist:
//!
//! - [`WalletPayloadWrapper`] is the wire form: a small JSON envelope
//!   carrying the version tag, the PBKDF2 iteration count, and the
//!   still-encrypted inner payload string.
//! - [`Wrapper`] is the in-memory form after decryption: the parsed
//!   [`WalletSnapshot`] plus the encryption parameters needed to seal
//!   it again.
//!
//! Wrappers are replaced, never mutated: every upgrade step consumes a
//! wrapper and produces a new one, so a failed step leaves the caller
//! holding the untouched original.

use serde::{Deserialize, Serialize};

use coffer_types::{PayloadDecodingError, WalletVersion};

use crate::wallet::WalletSnapshot;

// ---------------------------------------------------------------------------
// WalletPayloadWrapper (wire form)
// ---------------------------------------------------------------------------

/// The encrypted payload envelope as it appears on the wire.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalletPayloadWrapper {
    /// PBKDF2 iteration count used for the inner payload.
    pub pbkdf2_iterations: u32,
    /// Wallet payload generation (1..=4 when supported).
    pub version: u32,
    /// Base64 blob: 16-byte IV followed by the AES-256-CBC ciphertext.
    pub payload: String,
}

impl WalletPayloadWrapper {
    /// Decodes a wire envelope from an optional raw JSON string.
    ///
    /// `None` maps to [`PayloadDecodingError::MissingRawInput`]; the
    /// server withholds the payload field while two-factor
    /// authentication is pending, and that absence must be
    /// distinguishable from a parse failure.
    pub fn decode(raw: Option<&str>) -> Result<Self, PayloadDecodingError> {
        let raw = raw.ok_or(PayloadDecodingError::MissingRawInput)?;
        serde_json::from_str(raw).map_err(|err| PayloadDecodingError::MalformedEnvelope {
            reason: err.to_string(),
        })
    }

    /// Decodes a wire envelope from raw bytes.
    ///
    /// Non-UTF-8 input is a conversion failure, reported before any
    /// JSON parsing happens.
    pub fn decode_bytes(raw: &[u8]) -> Result<Self, PayloadDecodingError> {
        let text = std::str::from_utf8(raw).map_err(|err| {
            PayloadDecodingError::DataConversionFailure {
                reason: err.to_string(),
            }
        })?;
        Self::decode(Some(text))
    }

    /// Serializes the envelope back to its wire JSON form.
    pub fn encode(&self) -> Result<String, PayloadDecodingError> {
        serde_json::to_string(self).map_err(|err| PayloadDecodingError::MalformedEnvelope {
            reason: err.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Wrapper (in-memory form)
// ---------------------------------------------------------------------------

/// A decrypted wallet payload with its envelope parameters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wrapper {
    /// PBKDF2 iteration count to use when sealing this wrapper.
    pub pbkdf2_iterations: u32,
    /// Payload generation of the contained snapshot.
    pub version: WalletVersion,
    /// Checksum the server recorded for the plaintext, when known.
    pub payload_checksum: Option<String>,
    /// User's preferred language, when the server reported one.
    pub language: Option<String>,
    /// Whether derived public keys should be re-uploaded after the
    /// next seal.
    pub sync_pubkeys: bool,
    /// The decrypted wallet contents.
    pub wallet: WalletSnapshot,
}

impl Wrapper {
    /// Creates a wrapper around a snapshot, with no server metadata.
    pub fn new(version: WalletVersion, pbkdf2_iterations: u32, wallet: WalletSnapshot) -> Self {
        Self {
            pbkdf2_iterations,
            version,
            payload_checksum: None,
            language: None,
            sync_pubkeys: false,
            wallet,
        }
    }

    /// A copy of this wrapper holding a different snapshot, with the
    /// version advanced. Used by upgrade workflows, which never mutate
    /// their input. The stale checksum is dropped; it described the
    /// old plaintext.
    pub fn advanced(&self, version: WalletVersion, wallet: WalletSnapshot) -> Self {
        Self {
            pbkdf2_iterations: self.pbkdf2_iterations,
            version,
            payload_checksum: None,
            language: self.language.clone(),
            sync_pubkeys: self.sync_pubkeys,
            wallet,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_missing_input() {
        let result = WalletPayloadWrapper::decode(None);
        assert!(matches!(result, Err(PayloadDecodingError::MissingRawInput)));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let result = WalletPayloadWrapper::decode(Some("{not json"));
        assert!(matches!(
            result,
            Err(PayloadDecodingError::MalformedEnvelope { .. })
        ));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let result = WalletPayloadWrapper::decode(Some(r#"{"version":3}"#));
        assert!(matches!(
            result,
            Err(PayloadDecodingError::MalformedEnvelope { .. })
        ));
    }

    #[test]
    fn decode_bytes_rejects_non_utf8() {
        let result = WalletPayloadWrapper::decode_bytes(&[0xFF, 0xFE, 0x00]);
        assert!(matches!(
            result,
            Err(PayloadDecodingError::DataConversionFailure { .. })
        ));
    }

    #[test]
    fn wire_envelope_roundtrip() -> Result<(), PayloadDecodingError> {
        let envelope = WalletPayloadWrapper {
            pbkdf2_iterations: 5000,
            version: 4,
            payload: "aGVsbG8=".into(),
        };
        let encoded = envelope.encode()?;
        let decoded = WalletPayloadWrapper::decode(Some(&encoded))?;
        assert_eq!(decoded, envelope);
        Ok(())
    }

    #[test]
    fn decode_accepts_unknown_version_numbers() -> Result<(), PayloadDecodingError> {
        // Version validation happens in the crypto layer, not here; the
        // envelope itself must still parse so the error can name the
        // offending version.
        let decoded = WalletPayloadWrapper::decode(Some(
            r#"{"pbkdf2_iterations":5000,"version":9,"payload":"aGVsbG8="}"#,
        ))?;
        assert_eq!(decoded.version, 9);
        Ok(())
    }
}
