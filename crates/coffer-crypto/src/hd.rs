//! Hardened BIP32 child derivation over secp256k1.
//!
//! Implements the private-parent → private-child step (CKDpriv) for
//! hardened indices only, as used by the metadata node hierarchy:
//!
//! ```text
//! I  = HMAC-SHA512(key = chain_code,
//!                  data = 0x00 || ser256(k_par) || ser32(i | 0x80000000))
//! IL = I[0..32]  → child key tweak (child = (IL + k_par) mod n)
//! IR = I[32..64] → child chain code
//! ```
//!
//! Hardened derivation never exposes the parent public key in the HMAC
//! input, so a child private key cannot be recovered from the parent's
//! public material alone.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use coffer_types::DerivationError;
use hmac::{Hmac, Mac};
use k256::elliptic_curve::PrimeField;
use k256::{Scalar, SecretKey};
use sha2::Sha512;
use zeroize::Zeroize;

/// HMAC-SHA512 type alias used throughout BIP32.
type HmacSha512 = Hmac<Sha512>;

/// The hardened index offset (0x80000000) per BIP-32.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Derives a hardened child key and chain code from a parent key.
///
/// `index` is the raw child index (without the hardened offset); the
/// offset is OR-ed in before serialization.
///
/// # Errors
///
/// Returns [`DerivationError::InvalidDerivedKey`] when `IL` is not a
/// valid curve scalar or the resulting child key is zero. Both cases
/// are astronomically rare but must be rejected per BIP32.
pub fn derive_hardened_child(
    parent_key: &SecretKey,
    parent_chain_code: &[u8; 32],
    index: u32,
) -> Result<(SecretKey, [u8; 32]), DerivationError> {
    // data = 0x00 || parent_key (32 bytes) || index_be (4 bytes) = 37 bytes
    let mut data = [0u8; 37];
    data[0] = 0x00;
    data[1..33].copy_from_slice(&parent_key.to_bytes());
    data[33..37].copy_from_slice(&(index | HARDENED_OFFSET).to_be_bytes());

    let mut i = hmac_sha512(parent_chain_code, &data);
    data.zeroize();

    let mut il = [0u8; 32];
    let mut child_chain = [0u8; 32];
    il.copy_from_slice(&i[..32]);
    child_chain.copy_from_slice(&i[32..]);
    i.zeroize();

    // IL must be a valid scalar (< n); from_repr rejects out-of-range.
    let tweak = Option::<Scalar>::from(Scalar::from_repr(il.into()))
        .ok_or(DerivationError::InvalidDerivedKey { index })?;
    il.zeroize();

    let parent_scalar = *parent_key.to_nonzero_scalar().as_ref();
    let child_scalar = tweak + parent_scalar;

    let child_bytes = child_scalar.to_bytes();
    let child_key = SecretKey::from_bytes(&child_bytes)
        .map_err(|_| DerivationError::InvalidDerivedKey { index })?;

    Ok((child_key, child_chain))
}

/// Computes HMAC-SHA512 and returns the 64-byte output.
///
/// HMAC-SHA512 accepts keys of any length, so initialization cannot
/// fail for our fixed 32-byte chain codes.
fn hmac_sha512(key: &[u8; 32], data: &[u8]) -> [u8; 64] {
    let mut mac =
        HmacSha512::new_from_slice(key).expect("HMAC-SHA512 accepts any key length");
    mac.update(data);
    let result = mac.finalize().into_bytes();

    let mut output = [0u8; 64];
    output.copy_from_slice(&result);
    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- BIP32 test vector 1 ---
    //
    // Seed (hex): 000102030405060708090a0b0c0d0e0f
    // From: https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki
    //
    // Chain m:
    //   private: e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35
    //   chain:   873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508
    // Chain m/0':
    //   private: edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea
    //   chain:   47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141

    const MASTER_KEY: &str = "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35";
    const MASTER_CHAIN: &str = "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508";

    fn vector1_master() -> (SecretKey, [u8; 32]) {
        let key_bytes = hex::decode(MASTER_KEY).expect("valid hex");
        let chain_bytes = hex::decode(MASTER_CHAIN).expect("valid hex");
        let key = SecretKey::from_slice(&key_bytes).expect("valid key");
        let mut chain = [0u8; 32];
        chain.copy_from_slice(&chain_bytes);
        (key, chain)
    }

    #[test]
    fn bip32_vector1_child_m0h() -> Result<(), DerivationError> {
        let (master_key, master_chain) = vector1_master();
        let (child_key, child_chain) = derive_hardened_child(&master_key, &master_chain, 0)?;

        assert_eq!(
            hex::encode(child_key.to_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(child_chain),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        Ok(())
    }

    #[test]
    fn derivation_is_deterministic() -> Result<(), DerivationError> {
        let (master_key, master_chain) = vector1_master();
        let (a, chain_a) = derive_hardened_child(&master_key, &master_chain, 7)?;
        let (b, chain_b) = derive_hardened_child(&master_key, &master_chain, 7)?;
        assert_eq!(a.to_bytes(), b.to_bytes());
        assert_eq!(chain_a, chain_b);
        Ok(())
    }

    #[test]
    fn sibling_indices_diverge() -> Result<(), DerivationError> {
        let (master_key, master_chain) = vector1_master();
        let (a, _) = derive_hardened_child(&master_key, &master_chain, 2)?;
        let (b, _) = derive_hardened_child(&master_key, &master_chain, 3)?;
        assert_ne!(a.to_bytes(), b.to_bytes());
        Ok(())
    }

    #[test]
    fn hardened_offset_is_applied() -> Result<(), DerivationError> {
        // Index 0 and index HARDENED_OFFSET serialize identically after
        // the OR, so both must produce the same child.
        let (master_key, master_chain) = vector1_master();
        let (a, _) = derive_hardened_child(&master_key, &master_chain, 0)?;
        let (b, _) = derive_hardened_child(&master_key, &master_chain, HARDENED_OFFSET)?;
        assert_eq!(a.to_bytes(), b.to_bytes());
        Ok(())
    }
}
