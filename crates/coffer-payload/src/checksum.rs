//! Payload checksum: SHA-256 over the decrypted canonical payload.
//!
//! The checksum detects corruption or man-in-the-middle substitution
//! after decryption. A mismatch is a hard failure, never a warning.

use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 checksum of a payload.
pub fn payload_checksum(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sha256_vector() {
        // SHA-256("abc") from FIPS 180-2.
        assert_eq!(
            payload_checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn single_byte_flip_changes_checksum() {
        let mut payload = b"{\"guid\":\"fixture\"}".to_vec();
        let original = payload_checksum(&payload);
        payload[3] ^= 0x01;
        assert_ne!(payload_checksum(&payload), original);
    }

    #[test]
    fn checksum_is_lowercase_hex() {
        let checksum = payload_checksum(b"payload");
        assert_eq!(checksum.len(), 64);
        assert!(checksum
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
