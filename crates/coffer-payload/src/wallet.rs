//! Decrypted wallet snapshot JSON model.
//!
//! Field names follow the existing wire format exactly (mixed
//! camelCase/snake_case is historical and load-bearing — renaming a
//! field orphans deployed wallets). A snapshot is exclusively owned by
//! the [`Wrapper`](crate::wrapper::Wrapper) containing it; upgrades
//! consume one snapshot and produce a new one, never mutate in place.

use serde::{Deserialize, Serialize};

/// Default PBKDF2 iteration count for v2+ wallets.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 5000;

// ---------------------------------------------------------------------------
// WalletSnapshot
// ---------------------------------------------------------------------------

/// The decrypted wallet contents.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Wallet identifier.
    pub guid: String,
    /// Server-issued shared key.
    #[serde(rename = "sharedKey")]
    pub shared_key: String,
    /// Whether a second password encrypts private keys individually.
    pub double_encryption: bool,
    /// Hash of the second password, present when double encryption is
    /// enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpasswordhash: Option<String>,
    /// Serialized metadata HD node, if the wallet has provisioned one.
    #[serde(rename = "metadataHDNode", default, skip_serializing_if = "Option::is_none")]
    pub metadata_hd_node: Option<String>,
    /// Wallet-level options.
    #[serde(default)]
    pub options: WalletOptions,
    /// Imported (non-HD) addresses.
    #[serde(default)]
    pub keys: Vec<AddressEntry>,
    /// HD wallet list. Empty for pre-v3 wallets.
    #[serde(default)]
    pub hd_wallets: Vec<HdWallet>,
}

impl WalletSnapshot {
    /// Whether this snapshot carries an HD wallet section.
    pub fn is_hd(&self) -> bool {
        !self.hd_wallets.is_empty()
    }

    /// Whether any HD account still lacks a segwit (bech32)
    /// derivation.
    pub fn needs_segwit_derivations(&self) -> bool {
        self.hd_wallets.iter().any(|hd| {
            hd.accounts
                .iter()
                .any(|account| account.derivation(DerivationType::Bech32).is_none())
        })
    }
}

// ---------------------------------------------------------------------------
// WalletOptions
// ---------------------------------------------------------------------------

/// Wallet-level options carried inside the snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalletOptions {
    /// PBKDF2 iteration count used to encrypt this wallet.
    pub pbkdf2_iterations: u32,
    /// Fee per kilobyte, in satoshi.
    pub fee_per_kb: u64,
    /// Whether HTML5 notifications are enabled.
    pub html5_notifications: bool,
    /// Auto-logout time in milliseconds.
    pub logout_time: u64,
}

impl Default for WalletOptions {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            fee_per_kb: 10_000,
            html5_notifications: false,
            logout_time: 600_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AddressEntry
// ---------------------------------------------------------------------------

/// An imported (non-HD) address with its optional private key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AddressEntry {
    /// Base58 address string.
    pub addr: String,
    /// Private key (base58), absent for watch-only entries. Encrypted
    /// with the second password when double encryption is enabled.
    #[serde(rename = "priv", default, skip_serializing_if = "Option::is_none")]
    pub priv_key: Option<String>,
    /// Creation timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<u64>,
    /// Archive tag (2 = archived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<u32>,
    /// User-assigned label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// ---------------------------------------------------------------------------
// HdWallet
// ---------------------------------------------------------------------------

/// One hierarchical-deterministic wallet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HdWallet {
    /// BIP39 entropy as hex; the mnemonic is reconstructible from it.
    pub seed_hex: String,
    /// BIP39 passphrase ("" when unset).
    #[serde(default)]
    pub passphrase: String,
    /// Whether the user has confirmed their recovery phrase.
    #[serde(default)]
    pub mnemonic_verified: bool,
    /// Index of the default account.
    #[serde(default)]
    pub default_account_idx: u32,
    /// Account list, ordered by derivation index.
    pub accounts: Vec<Account>,
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One HD account with its derivation records.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// User-visible account label.
    pub label: String,
    /// Whether the account is archived.
    #[serde(default)]
    pub archived: bool,
    /// Type of the derivation used for new receive addresses.
    #[serde(default = "default_derivation_type")]
    pub default_derivation: DerivationType,
    /// Derivation records; v4 accounts carry both legacy and bech32.
    pub derivations: Vec<Derivation>,
}

fn default_derivation_type() -> DerivationType {
    DerivationType::Bech32
}

impl Account {
    /// Returns the derivation record of the given type, if present.
    pub fn derivation(&self, kind: DerivationType) -> Option<&Derivation> {
        self.derivations.iter().find(|d| d.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Address scheme of a derivation record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivationType {
    /// P2PKH, purpose 44.
    Legacy,
    /// Native segwit, purpose 84.
    Bech32,
}

impl DerivationType {
    /// BIP43 purpose associated with this derivation type.
    pub fn purpose(self) -> u32 {
        match self {
            Self::Legacy => 44,
            Self::Bech32 => 84,
        }
    }
}

/// One account-level derivation record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    /// Address scheme.
    #[serde(rename = "type")]
    pub kind: DerivationType,
    /// BIP43 purpose (44 or 84); kept on the wire alongside `type`.
    pub purpose: u32,
    /// Extended private key (`xprv…`), encrypted with the second
    /// password when double encryption is enabled.
    pub xpriv: String,
    /// Extended public key (`xpub…`).
    pub xpub: String,
    /// Labels pinned to individual receive indices.
    #[serde(default)]
    pub address_labels: Vec<AddressLabel>,
    /// Cached chain-level xpubs for fast address generation.
    #[serde(default)]
    pub cache: DerivationCache,
}

/// A user label pinned to one receive address index.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AddressLabel {
    /// Receive chain index.
    pub index: u32,
    /// Label text.
    pub label: String,
}

/// Cached receive/change chain xpubs.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DerivationCache {
    /// Receive chain (`…/0`) xpub.
    #[serde(rename = "receiveAccount", default, skip_serializing_if = "Option::is_none")]
    pub receive_account: Option<String>,
    /// Change chain (`…/1`) xpub.
    #[serde(rename = "changeAccount", default, skip_serializing_if = "Option::is_none")]
    pub change_account: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
