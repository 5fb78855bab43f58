//! Core shared types for the Coffer wallet payload subsystem.
//!
//! This crate defines the domain types and the error taxonomy used
//! across the workspace. No other crate should define shared types —
//! everything lives here.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Wallet credentials supplied by the session/authentication layer.
///
/// Immutable value type. The password never leaves this struct through
/// `Debug` output, and credentials are never persisted outside the
/// encrypted payload — they exist only for the duration of a
/// derivation or codec call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Wallet identifier (a UUID string on the wire).
    pub guid: String,
    /// Server-issued shared key for this wallet.
    pub shared_key: String,
    /// The user's wallet password.
    pub password: String,
}

impl Credentials {
    /// Creates a new credentials value.
    pub fn new(
        guid: impl Into<String>,
        shared_key: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            shared_key: shared_key.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("guid", &self.guid)
            .field("shared_key", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// WalletVersion
// ---------------------------------------------------------------------------

/// Supported wallet payload generations.
///
/// Versions form a total order (`V1 < V2 < V3 < V4`). `V4` — the
/// segwit-capable HD wallet — is the terminal state the upgrade
/// pipeline drives toward.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum WalletVersion {
    /// Legacy single-key wallet, fixed low-iteration encryption.
    V1,
    /// Configurable PBKDF2 iterations and double-encryption support.
    V2,
    /// Hierarchical-deterministic wallet (BIP44 legacy derivation).
    V3,
    /// HD wallet with segwit (bech32) derivations.
    V4,
}

impl WalletVersion {
    /// The newest payload generation this build understands.
    pub const LATEST: WalletVersion = WalletVersion::V4;

    /// Integer version tag as it appears on the wire.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }
}

impl TryFrom<u32> for WalletVersion {
    type Error = UnsupportedVersion;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            other => Err(UnsupportedVersion(other)),
        }
    }
}

impl From<WalletVersion> for u32 {
    fn from(version: WalletVersion) -> u32 {
        version.as_u32()
    }
}

impl fmt::Display for WalletVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u32())
    }
}

/// A version tag outside the supported `1..=4` range.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("unsupported wallet payload version {0}")]
pub struct UnsupportedVersion(pub u32);

// ---------------------------------------------------------------------------
// DerivationError
// ---------------------------------------------------------------------------

/// Failures of deterministic key derivation.
///
/// All variants are fatal to the current operation and never retried
/// automatically: retrying with identical input reproduces the
/// identical error.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// UTF-8 encoding of the credential digest input failed.
    ///
    /// Unreachable for valid Rust strings; kept explicit because the
    /// digest input crosses a trust boundary.
    #[error("failed to encode digest input data")]
    DigestDataEncodingFailed,

    /// The 32-byte digest does not map to a valid secp256k1 private
    /// key (zero or ≥ the curve order). Astronomically rare.
    #[error("digest does not form a valid private key")]
    PrivateKeyInstantiationFailed,

    /// A hardened child derivation produced invalid key material.
    #[error("hardened derivation produced an invalid child key at index {index}")]
    InvalidDerivedKey {
        /// Child index (without the hardened offset) that failed.
        index: u32,
    },

    /// The mnemonic failed BIP39 validation (bad checksum or word
    /// count), or the HD wallet could not be constructed from it.
    #[error("HD wallet initialization failed: {reason}")]
    HdWalletCreationFailed {
        /// Human-readable description of the initialization failure.
        reason: String,
    },

    /// A derivation path component is malformed.
    #[error("invalid derivation path: {reason}")]
    InvalidDerivationPath {
        /// Human-readable description of the path problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// PayloadDecodingError
// ---------------------------------------------------------------------------

/// Failures while decoding the wallet payload wire envelope, before
/// any cryptography runs.
#[derive(Debug, Error)]
pub enum PayloadDecodingError {
    /// The source string is absent (e.g. payload withheld pending 2FA).
    #[error("missing raw payload input")]
    MissingRawInput,

    /// The source string could not be converted to the expected byte
    /// encoding before JSON parsing.
    #[error("payload data conversion failed: {reason}")]
    DataConversionFailure {
        /// Human-readable description of the conversion failure.
        reason: String,
    },

    /// The envelope parsed as JSON but violates the expected shape.
    #[error("malformed payload envelope: {reason}")]
    MalformedEnvelope {
        /// Human-readable description of the shape violation.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// PayloadCryptoError
// ---------------------------------------------------------------------------

/// Failures while encrypting or decrypting wallet payloads.
///
/// `DecryptionFailed` (wrong password or corrupted ciphertext) is kept
/// distinct from `ChecksumMismatch` (post-decryption corruption or
/// substitution) because the user-facing remediation differs.
#[derive(Debug, Error)]
pub enum PayloadCryptoError {
    /// The wrapper carries a version newer than this build supports.
    #[error(transparent)]
    UnsupportedPayloadVersion(#[from] UnsupportedVersion),

    /// The wire envelope failed to decode before any cryptography ran.
    ///
    /// Carries the decoding cause so an absent payload (second factor
    /// still pending) stays distinguishable from corrupt data — the
    /// user-facing remediation differs.
    #[error(transparent)]
    Decoding(#[from] PayloadDecodingError),

    /// PBKDF2 password stretching failed (invalid parameters).
    #[error("payload key derivation failed")]
    KeyDerivationFailed,

    /// The ciphertext blob is not valid base64 or is truncated.
    #[error("payload decoding failed")]
    DecodingFailed,

    /// Symmetric decryption failed: wrong password or corrupted data.
    #[error("payload decryption failed")]
    DecryptionFailed,

    /// Symmetric encryption failed.
    #[error("payload encryption failed")]
    EncryptionFailed,

    /// Every legacy v1 decryption mode was exhausted without success.
    #[error("failed to decrypt v1 payload")]
    FailedToDecryptV1Payload,

    /// The recomputed plaintext checksum does not match the wrapper.
    ///
    /// Hard failure: indicates corruption or payload substitution.
    #[error("payload checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        /// Checksum recorded in the wrapper.
        expected: String,
        /// Checksum recomputed over the decrypted payload.
        computed: String,
    },

    /// The decrypted plaintext is not a valid wallet snapshot.
    #[error("decrypted wallet payload is malformed: {reason}")]
    MalformedWallet {
        /// Human-readable description of the parse failure.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// WalletUpgradeError
// ---------------------------------------------------------------------------

/// A wallet upgrade workflow failed.
///
/// Carries the version the failing workflow was upgrading *to*, so a
/// partial migration can be diagnosed without ever being persisted.
/// The upgrader does not retry; callers decide whether to retry the
/// whole pipeline from the original wrapper.
#[derive(Debug, Error)]
#[error("upgrade to wallet {version} failed: {reason}")]
pub struct WalletUpgradeError {
    /// Target version of the workflow that failed.
    pub version: WalletVersion,
    /// Human-readable description of the failure.
    pub reason: String,
}

impl WalletUpgradeError {
    /// Creates an upgrade error for the given target version.
    pub fn new(version: WalletVersion, reason: impl Into<String>) -> Self {
        Self {
            version,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// WalletSyncError
// ---------------------------------------------------------------------------

/// Failures reported by the remote synchronization collaborator.
///
/// Retries are the collaborator's responsibility, never the upgrader's.
#[derive(Debug, Error)]
pub enum WalletSyncError {
    /// The server rejected the uploaded wrapper.
    #[error("wallet sync rejected: {reason}")]
    Rejected {
        /// Server-supplied rejection message.
        reason: String,
    },

    /// The wrapper could not be encoded for upload.
    #[error("wallet sync encoding failed: {reason}")]
    EncodingFailed {
        /// Human-readable description of the encoding failure.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// SecureChannelError
// ---------------------------------------------------------------------------

/// Failures in the secure-channel pairing subsystem.
///
/// Non-retryable for a given message; a new pairing attempt must open
/// a fresh channel with a fresh device key.
#[derive(Debug, Error)]
pub enum SecureChannelError {
    /// ECDH key agreement failed (degenerate public key).
    #[error("secure channel key agreement failed")]
    KeyAgreementFailed,

    /// The pairing payload could not be encrypted.
    #[error("secure channel message encryption failed")]
    MessageEncryptionFailed,

    /// The pairing ciphertext could not be decrypted with the derived
    /// shared secret (bad ciphertext or wrong key).
    #[error("secure channel message decryption failed")]
    MessageDecryptionFailed,

    /// The pairing payload is structurally invalid.
    #[error("malformed pairing payload: {reason}")]
    MalformedPayload {
        /// Human-readable description of the payload problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering_is_total() {
        assert!(WalletVersion::V1 < WalletVersion::V2);
        assert!(WalletVersion::V2 < WalletVersion::V3);
        assert!(WalletVersion::V3 < WalletVersion::V4);
        assert_eq!(WalletVersion::LATEST, WalletVersion::V4);
    }

    #[test]
    fn version_u32_roundtrip() -> Result<(), UnsupportedVersion> {
        for raw in 1u32..=4 {
            let version = WalletVersion::try_from(raw)?;
            assert_eq!(version.as_u32(), raw);
        }
        Ok(())
    }

    #[test]
    fn version_rejects_out_of_range() {
        assert!(WalletVersion::try_from(0).is_err());
        assert!(WalletVersion::try_from(5).is_err());
    }

    #[test]
    fn version_serde_as_integer() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&WalletVersion::V3)?;
        assert_eq!(json, "3");
        let parsed: WalletVersion = serde_json::from_str("4")?;
        assert_eq!(parsed, WalletVersion::V4);
        Ok(())
    }

    #[test]
    fn version_serde_rejects_unsupported() {
        let parsed: Result<WalletVersion, _> = serde_json::from_str("9");
        assert!(parsed.is_err());
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let credentials = Credentials::new("guid", "shared", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("shared\""));
        assert!(rendered.contains("guid"));
    }

    #[test]
    fn upgrade_error_carries_version() {
        let err = WalletUpgradeError::new(WalletVersion::V3, "sync refused");
        assert_eq!(err.version, WalletVersion::V3);
        assert!(err.to_string().contains("v3"));
        assert!(err.to_string().contains("sync refused"));
    }

    #[test]
    fn checksum_mismatch_names_both_sides() {
        let err = PayloadCryptoError::ChecksumMismatch {
            expected: "aa".into(),
            computed: "bb".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("aa") && rendered.contains("bb"));
    }
}
