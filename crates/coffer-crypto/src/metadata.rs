//! Credential-derived metadata nodes.
//!
//! The second-password node is the root of the wallet's metadata key
//! hierarchy. It is recomputed on demand from credentials and never
//! persisted as plaintext:
//!
//! ```text
//! entropy = SHA256(utf8(guid + sharedKey + password))
//! root    = secp256k1 private key from entropy (bitcoin-style)
//! node_t  = CKDpriv(root, t | 0x80000000)   // one node per type
//! ```
//!
//! The credential concatenation carries no delimiter or length prefix.
//! This framing is part of the existing wire format and is preserved
//! exactly; changing it would orphan every deployed wallet.

use coffer_types::{Credentials, DerivationError};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::hd::derive_hardened_child;

/// Version byte for Bitcoin mainnet P2PKH addresses.
const P2PKH_VERSION: u8 = 0x00;

// ---------------------------------------------------------------------------
// MetadataNode
// ---------------------------------------------------------------------------

/// A derived keypair scoped to a metadata "type" namespace.
///
/// Holds the node's private key and chain code (for further hardened
/// derivation), its public `address`, and exposes the raw private-key
/// bytes as the node's symmetric `encryption_key`.
///
/// Deriving a node twice from identical inputs yields byte-identical
/// output; wallet recovery depends on this.
pub struct MetadataNode {
    type_index: Option<u32>,
    secret: SecretKey,
    chain_code: [u8; 32],
    address: String,
}

// MetadataNode does not implement Clone/Debug to prevent leakage.

impl MetadataNode {
    fn new(type_index: Option<u32>, secret: SecretKey, chain_code: [u8; 32]) -> Self {
        let address = p2pkh_address(&secret.public_key());
        Self {
            type_index,
            secret,
            chain_code,
            address,
        }
    }

    /// The metadata type namespace this node belongs to, or `None`
    /// for the root node.
    pub fn type_index(&self) -> Option<u32> {
        self.type_index
    }

    /// Public identifier of this node (Bitcoin P2PKH address of the
    /// compressed public key).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Raw symmetric key material: the node's private-key bytes.
    ///
    /// Zeroized when the returned guard is dropped.
    pub fn encryption_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes().into())
    }

    /// Derives the hardened child node for metadata type `type_index`.
    ///
    /// Unrelated metadata entries get unrelated nodes: a shared parent
    /// key alone is not enough to correlate two type namespaces.
    pub fn derive(&self, type_index: u32) -> Result<MetadataNode, DerivationError> {
        let (child_key, child_chain) =
            derive_hardened_child(&self.secret, &self.chain_code, type_index)?;
        Ok(MetadataNode::new(Some(type_index), child_key, child_chain))
    }
}

// ---------------------------------------------------------------------------
// SecondPasswordNode
// ---------------------------------------------------------------------------

/// Root metadata node derived from wallet credentials.
///
/// Recomputed on demand; the underlying key material lives only as
/// long as this value.
pub struct SecondPasswordNode {
    node: MetadataNode,
}

impl SecondPasswordNode {
    /// The root [`MetadataNode`].
    pub fn metadata_node(&self) -> &MetadataNode {
        &self.node
    }

    /// Shorthand for the root node's address.
    pub fn address(&self) -> &str {
        self.node.address()
    }

    /// Derives the metadata node for the given type namespace.
    pub fn derive(&self, type_index: u32) -> Result<MetadataNode, DerivationError> {
        self.node.derive(type_index)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the second-password node from wallet credentials.
///
/// The SHA-256 digest of the concatenated credentials becomes the
/// secp256k1 private key directly. The root chain code is the SHA-256
/// of that digest, fixing a deterministic anchor for the hardened
/// per-type hierarchy.
///
/// # Errors
///
/// [`DerivationError::PrivateKeyInstantiationFailed`] when the digest
/// is zero or not below the curve order. This cannot be ignored even
/// though it is astronomically rare.
pub fn derive_second_password_node(
    credentials: &Credentials,
) -> Result<SecondPasswordNode, DerivationError> {
    // The concatenated buffer carries the password; both it and the
    // digest are wiped once the key exists.
    let mut input = Zeroizing::new(String::with_capacity(
        credentials.guid.len() + credentials.shared_key.len() + credentials.password.len(),
    ));
    input.push_str(&credentials.guid);
    input.push_str(&credentials.shared_key);
    input.push_str(&credentials.password);

    let digest = Zeroizing::new(<[u8; 32]>::from(Sha256::digest(input.as_bytes())));

    let secret = SecretKey::from_slice(digest.as_slice())
        .map_err(|_| DerivationError::PrivateKeyInstantiationFailed)?;

    let chain_code: [u8; 32] = Sha256::digest(digest.as_slice()).into();

    Ok(SecondPasswordNode {
        node: MetadataNode::new(None, secret, chain_code),
    })
}

// ---------------------------------------------------------------------------
// Address encoding
// ---------------------------------------------------------------------------

/// Encodes a compressed public key as a Bitcoin mainnet P2PKH address:
/// `Base58Check(0x00 || RIPEMD160(SHA256(pubkey)))`.
fn p2pkh_address(public_key: &PublicKey) -> String {
    let compressed = public_key.to_encoded_point(true);
    let sha = Sha256::digest(compressed.as_bytes());
    let hash160 = Ripemd160::digest(sha);

    let mut payload = [0u8; 21];
    payload[0] = P2PKH_VERSION;
    payload[1..].copy_from_slice(&hash160);

    bs58::encode(payload).with_check().into_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_credentials() -> Credentials {
        Credentials::new(
            "22d57944-bb00-49e5-bc96-e2c31e0a0ff1",
            "42cf2bc0b13b4be5b1d2b6c6a2521400",
            "correct-horse",
        )
    }

    #[test]
    fn second_password_node_is_deterministic() -> Result<(), DerivationError> {
        let credentials = fixture_credentials();
        let a = derive_second_password_node(&credentials)?;
        let b = derive_second_password_node(&credentials)?;

        assert_eq!(a.address(), b.address());
        assert_eq!(
            *a.metadata_node().encryption_key(),
            *b.metadata_node().encryption_key()
        );
        Ok(())
    }

    #[test]
    fn encryption_key_equals_digest_of_credentials() -> Result<(), DerivationError> {
        let credentials = fixture_credentials();
        let node = derive_second_password_node(&credentials)?;

        let concatenated = format!(
            "{}{}{}",
            credentials.guid, credentials.shared_key, credentials.password
        );
        let digest: [u8; 32] = Sha256::digest(concatenated.as_bytes()).into();

        assert_eq!(*node.metadata_node().encryption_key(), digest);
        Ok(())
    }

    #[test]
    fn address_is_mainnet_p2pkh() -> Result<(), DerivationError> {
        let node = derive_second_password_node(&fixture_credentials())?;
        // Version byte 0x00 always renders with a leading '1'.
        assert!(node.address().starts_with('1'));
        assert!(node.address().len() >= 26 && node.address().len() <= 35);
        Ok(())
    }

    #[test]
    fn different_credentials_different_nodes() -> Result<(), DerivationError> {
        let a = derive_second_password_node(&fixture_credentials())?;
        let b = derive_second_password_node(&Credentials::new(
            "22d57944-bb00-49e5-bc96-e2c31e0a0ff1",
            "42cf2bc0b13b4be5b1d2b6c6a2521400",
            "wrong-horse",
        ))?;
        assert_ne!(a.address(), b.address());
        Ok(())
    }

    #[test]
    fn type_namespaces_are_uncorrelated() -> Result<(), DerivationError> {
        let root = derive_second_password_node(&fixture_credentials())?;
        let entry = root.derive(2)?;
        let contacts = root.derive(4)?;

        assert_eq!(entry.type_index(), Some(2));
        assert_eq!(contacts.type_index(), Some(4));
        assert_ne!(entry.address(), contacts.address());
        assert_ne!(*entry.encryption_key(), *contacts.encryption_key());
        Ok(())
    }

    #[test]
    fn typed_derivation_is_deterministic() -> Result<(), DerivationError> {
        let root = derive_second_password_node(&fixture_credentials())?;
        let a = root.derive(5)?;
        let b = root.derive(5)?;
        assert_eq!(a.address(), b.address());
        assert_eq!(*a.encryption_key(), *b.encryption_key());
        Ok(())
    }
}
