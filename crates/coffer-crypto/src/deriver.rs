//! BIP39 mnemonic → extended Bitcoin keypair derivation.
//!
//! Builds a hierarchical-deterministic wallet from a mnemonic phrase
//! plus optional passphrase and derives the extended private/public
//! keys at the account level of the BIP44/BIP84 tree:
//!
//! ```text
//! m / purpose' / 0' / account'
//! ```
//!
//! `purpose` 44 yields legacy (P2PKH) account keys, 84 yields segwit
//! (bech32) account keys. Both are consumed by the wallet payload
//! model as Base58Check `xprv`/`xpub` strings.

use bip32::{DerivationPath, Prefix, XPrv};
use bip39::{Language, Mnemonic};
use coffer_types::DerivationError;

/// BIP44 purpose for legacy P2PKH derivations.
pub const PURPOSE_LEGACY: u32 = 44;

/// BIP84 purpose for segwit (bech32) derivations.
pub const PURPOSE_SEGWIT: u32 = 84;

// ---------------------------------------------------------------------------
// BitcoinKeyPair
// ---------------------------------------------------------------------------

/// Extended account-level keypair in Base58Check form.
pub struct BitcoinKeyPair {
    /// Extended private key (`xprv…`).
    pub xpriv: String,
    /// Extended public key (`xpub…`).
    pub xpub: String,
}

// BitcoinKeyPair does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// BitcoinKeyPairDeriver
// ---------------------------------------------------------------------------

/// Derives account keypairs from BIP39 mnemonics.
pub struct BitcoinKeyPairDeriver;

impl BitcoinKeyPairDeriver {
    /// Derives the legacy (`m/44'/0'/0'`) account keypair from a
    /// mnemonic and optional passphrase.
    ///
    /// # Errors
    ///
    /// [`DerivationError::HdWalletCreationFailed`] when the mnemonic
    /// fails BIP39 validation (bad checksum or word count).
    pub fn derive(
        mnemonic: &str,
        passphrase: Option<&str>,
    ) -> Result<BitcoinKeyPair, DerivationError> {
        let parsed = Mnemonic::parse_in(Language::English, mnemonic).map_err(|e| {
            DerivationError::HdWalletCreationFailed {
                reason: format!("invalid mnemonic: {e}"),
            }
        })?;
        let seed = parsed.to_seed(passphrase.unwrap_or(""));
        derive_account_keys(&seed, PURPOSE_LEGACY, 0)
    }
}

/// Derives the extended keypair at `m/purpose'/0'/account'` from a
/// raw BIP39 seed.
///
/// Used directly by the segwit upgrade path, which re-derives from the
/// wallet's stored seed rather than a mnemonic.
pub fn derive_account_keys(
    seed: &[u8],
    purpose: u32,
    account: u32,
) -> Result<BitcoinKeyPair, DerivationError> {
    let path: DerivationPath = format!("m/{purpose}'/0'/{account}'").parse().map_err(
        |e: bip32::Error| DerivationError::InvalidDerivationPath {
            reason: e.to_string(),
        },
    )?;

    let xprv = XPrv::derive_from_path(seed, &path).map_err(|e| {
        DerivationError::HdWalletCreationFailed {
            reason: format!("account derivation failed: {e}"),
        }
    })?;
    let xpub = xprv.public_key();

    Ok(BitcoinKeyPair {
        xpriv: xprv.to_string(Prefix::XPRV).as_str().to_owned(),
        xpub: xpub.to_string(Prefix::XPUB),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
