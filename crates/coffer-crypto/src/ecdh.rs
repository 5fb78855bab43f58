//! secp256k1 Elliptic-Curve Diffie-Hellman for secure-channel pairing.
//!
//! Derives the symmetric channel key as the SHA-256 of the compressed
//! shared point, matching the libsecp256k1 ECDH convention used by the
//! browser side of the pairing protocol. Both parties computing with
//! the other's public key derive the identical key.

use coffer_types::SecureChannelError;
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ProjectivePoint, PublicKey, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// SharedChannelKey
// ---------------------------------------------------------------------------

/// 256-bit symmetric key agreed over ECDH.
///
/// Zeroized on drop; feeds directly into the AES channel cipher.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SharedChannelKey([u8; 32]);

impl SharedChannelKey {
    /// Returns the raw 32-byte key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// SharedChannelKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Key agreement
// ---------------------------------------------------------------------------

/// Performs secp256k1 ECDH between our private key and the peer's
/// public key.
///
/// `key = SHA256(compressed(remote_pub · d))`
///
/// # Errors
///
/// [`SecureChannelError::KeyAgreementFailed`] when the multiplication
/// degenerates to the point at infinity. Unreachable for honestly
/// generated keys, but the peer's key arrives over an untrusted relay.
pub fn derive_shared_secret(
    device_secret: &SecretKey,
    remote_public: &PublicKey,
) -> Result<SharedChannelKey, SecureChannelError> {
    let scalar = *device_secret.to_nonzero_scalar().as_ref();
    let shared_point = ProjectivePoint::from(*remote_public.as_affine()) * scalar;

    if bool::from(shared_point.is_identity()) {
        return Err(SecureChannelError::KeyAgreementFailed);
    }

    let compressed = shared_point.to_affine().to_encoded_point(true);
    let key: [u8; 32] = Sha256::digest(compressed.as_bytes()).into();

    Ok(SharedChannelKey(key))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn agreement_is_symmetric() -> Result<(), SecureChannelError> {
        let a = SecretKey::random(&mut OsRng);
        let b = SecretKey::random(&mut OsRng);

        let ab = derive_shared_secret(&a, &b.public_key())?;
        let ba = derive_shared_secret(&b, &a.public_key())?;
        assert_eq!(ab.as_bytes(), ba.as_bytes());
        Ok(())
    }

    #[test]
    fn agreement_is_deterministic() -> Result<(), SecureChannelError> {
        let a = SecretKey::random(&mut OsRng);
        let b_pub = SecretKey::random(&mut OsRng).public_key();

        let first = derive_shared_secret(&a, &b_pub)?;
        let second = derive_shared_secret(&a, &b_pub)?;
        assert_eq!(first.as_bytes(), second.as_bytes());
        Ok(())
    }

    #[test]
    fn distinct_peers_distinct_keys() -> Result<(), SecureChannelError> {
        let device = SecretKey::random(&mut OsRng);
        let peer_a = SecretKey::random(&mut OsRng).public_key();
        let peer_b = SecretKey::random(&mut OsRng).public_key();

        let with_a = derive_shared_secret(&device, &peer_a)?;
        let with_b = derive_shared_secret(&device, &peer_b)?;
        assert_ne!(with_a.as_bytes(), with_b.as_bytes());
        Ok(())
    }
}
