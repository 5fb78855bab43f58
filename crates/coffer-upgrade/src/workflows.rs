//! The concrete generation workflows: v2, v3, v4.
//!
//! Every workflow follows the same shape: build the upgraded wrapper,
//! push it through the [`WalletSyncing`] seam, and only then hand it
//! back. A wrapper that failed to sync is never returned, so local
//! state can not run ahead of the server.

use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use tracing::debug;

use coffer_crypto::deriver::{derive_account_keys, PURPOSE_LEGACY, PURPOSE_SEGWIT};
use coffer_payload::wallet::{
    Account, Derivation, DerivationCache, DerivationType, HdWallet, WalletSnapshot,
    DEFAULT_PBKDF2_ITERATIONS,
};
use coffer_payload::Wrapper;
use coffer_types::{WalletUpgradeError, WalletVersion};

use crate::sync::WalletSyncing;
use crate::upgrader::WalletUpgradeWorkflow;

/// Label given to the HD account created by the v3 upgrade.
const DEFAULT_ACCOUNT_LABEL: &str = "My Bitcoin Wallet";

/// Entropy drawn for a newly created HD wallet, in bytes.
pub const HD_ENTROPY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// EntropyProvider
// ---------------------------------------------------------------------------

/// Source of the entropy backing a newly created HD wallet.
///
/// Injected so tests can pin the seed; production uses [`OsEntropy`].
pub trait EntropyProvider: Send + Sync {
    /// Returns fresh entropy for one HD wallet.
    fn entropy(&self) -> [u8; HD_ENTROPY_LEN];
}

/// Operating-system CSPRNG entropy.
pub struct OsEntropy;

impl EntropyProvider for OsEntropy {
    fn entropy(&self) -> [u8; HD_ENTROPY_LEN] {
        let mut buf = [0u8; HD_ENTROPY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        buf
    }
}

// ---------------------------------------------------------------------------
// Version2Workflow
// ---------------------------------------------------------------------------

/// v1 → v2: adopt the configurable PBKDF2 iteration scheme.
pub struct Version2Workflow {
    syncing: Arc<dyn WalletSyncing>,
}

impl Version2Workflow {
    /// Creates the workflow with its sync collaborator.
    pub fn new(syncing: Arc<dyn WalletSyncing>) -> Self {
        Self { syncing }
    }
}

#[async_trait]
impl WalletUpgradeWorkflow for Version2Workflow {
    fn target(&self) -> WalletVersion {
        WalletVersion::V2
    }

    fn should_perform_upgrade(&self, wrapper: &Wrapper) -> bool {
        wrapper.version < WalletVersion::V2
    }

    async fn upgrade(
        &self,
        wrapper: Wrapper,
        password: &str,
    ) -> Result<Wrapper, WalletUpgradeError> {
        let mut wallet = wrapper.wallet.clone();
        wallet.options.pbkdf2_iterations = DEFAULT_PBKDF2_ITERATIONS;

        let mut upgraded = wrapper.advanced(WalletVersion::V2, wallet);
        upgraded.pbkdf2_iterations = DEFAULT_PBKDF2_ITERATIONS;

        self.syncing
            .sync(&upgraded, password)
            .await
            .map_err(|err| WalletUpgradeError::new(WalletVersion::V2, err.to_string()))?;
        Ok(upgraded)
    }
}

// ---------------------------------------------------------------------------
// Version3Workflow
// ---------------------------------------------------------------------------

/// v2 → v3: create the HD wallet.
pub struct Version3Workflow {
    syncing: Arc<dyn WalletSyncing>,
    entropy: Arc<dyn EntropyProvider>,
}

impl Version3Workflow {
    /// Creates the workflow with its sync and entropy collaborators.
    pub fn new(syncing: Arc<dyn WalletSyncing>, entropy: Arc<dyn EntropyProvider>) -> Self {
        Self { syncing, entropy }
    }
}

#[async_trait]
impl WalletUpgradeWorkflow for Version3Workflow {
    fn target(&self) -> WalletVersion {
        WalletVersion::V3
    }

    fn should_perform_upgrade(&self, wrapper: &Wrapper) -> bool {
        wrapper.version < WalletVersion::V3 || !wrapper.wallet.is_hd()
    }

    async fn upgrade(
        &self,
        wrapper: Wrapper,
        password: &str,
    ) -> Result<Wrapper, WalletUpgradeError> {
        let entropy = self.entropy.entropy();
        let hd_wallet = create_hd_wallet(&entropy)
            .map_err(|reason| WalletUpgradeError::new(WalletVersion::V3, reason))?;

        let mut wallet = wrapper.wallet.clone();
        wallet.hd_wallets = vec![hd_wallet];
        debug!(guid = %wallet.guid, "created HD wallet for v3 upgrade");

        let upgraded = wrapper.advanced(WalletVersion::V3, wallet);
        self.syncing
            .sync(&upgraded, password)
            .await
            .map_err(|err| WalletUpgradeError::new(WalletVersion::V3, err.to_string()))?;
        Ok(upgraded)
    }
}

/// Builds a fresh single-account HD wallet from raw entropy.
fn create_hd_wallet(entropy: &[u8; HD_ENTROPY_LEN]) -> Result<HdWallet, String> {
    let mnemonic = bip39::Mnemonic::from_entropy(entropy)
        .map_err(|err| format!("mnemonic construction failed: {err}"))?;
    let seed = mnemonic.to_seed("");

    let pair = derive_account_keys(&seed, PURPOSE_LEGACY, 0)
        .map_err(|err| format!("legacy account derivation failed: {err}"))?;

    Ok(HdWallet {
        seed_hex: hex::encode(entropy),
        passphrase: String::new(),
        mnemonic_verified: false,
        default_account_idx: 0,
        accounts: vec![Account {
            label: DEFAULT_ACCOUNT_LABEL.into(),
            archived: false,
            default_derivation: DerivationType::Legacy,
            derivations: vec![Derivation {
                kind: DerivationType::Legacy,
                purpose: PURPOSE_LEGACY,
                xpriv: pair.xpriv,
                xpub: pair.xpub,
                address_labels: vec![],
                cache: DerivationCache::default(),
            }],
        }],
    })
}

// ---------------------------------------------------------------------------
// Version4Workflow
// ---------------------------------------------------------------------------

/// v3 → v4: add segwit (bech32) derivations to every account.
pub struct Version4Workflow {
    syncing: Arc<dyn WalletSyncing>,
}

impl Version4Workflow {
    /// Creates the workflow with its sync collaborator.
    pub fn new(syncing: Arc<dyn WalletSyncing>) -> Self {
        Self { syncing }
    }
}

#[async_trait]
impl WalletUpgradeWorkflow for Version4Workflow {
    fn target(&self) -> WalletVersion {
        WalletVersion::V4
    }

    fn should_perform_upgrade(&self, wrapper: &Wrapper) -> bool {
        wrapper.version < WalletVersion::V4 || wrapper.wallet.needs_segwit_derivations()
    }

    async fn upgrade(
        &self,
        wrapper: Wrapper,
        password: &str,
    ) -> Result<Wrapper, WalletUpgradeError> {
        let mut wallet = wrapper.wallet.clone();
        add_segwit_derivations(&mut wallet)
            .map_err(|reason| WalletUpgradeError::new(WalletVersion::V4, reason))?;

        let upgraded = wrapper.advanced(WalletVersion::V4, wallet);
        self.syncing
            .sync(&upgraded, password)
            .await
            .map_err(|err| WalletUpgradeError::new(WalletVersion::V4, err.to_string()))?;
        Ok(upgraded)
    }
}

/// Appends an `m/84'/0'/account'` derivation to every account that
/// lacks one, re-deriving from the wallet's stored seed.
fn add_segwit_derivations(wallet: &mut WalletSnapshot) -> Result<(), String> {
    for hd in &mut wallet.hd_wallets {
        let entropy = hex::decode(&hd.seed_hex)
            .map_err(|err| format!("seed_hex is not valid hex: {err}"))?;
        let mnemonic = bip39::Mnemonic::from_entropy(&entropy)
            .map_err(|err| format!("mnemonic reconstruction failed: {err}"))?;
        let seed = mnemonic.to_seed(hd.passphrase.as_str());

        for (index, account) in hd.accounts.iter_mut().enumerate() {
            if account.derivation(DerivationType::Bech32).is_some() {
                continue;
            }
            let pair = derive_account_keys(&seed, PURPOSE_SEGWIT, index as u32)
                .map_err(|err| format!("segwit derivation failed: {err}"))?;
            account.derivations.push(Derivation {
                kind: DerivationType::Bech32,
                purpose: PURPOSE_SEGWIT,
                xpriv: pair.xpriv,
                xpub: pair.xpub,
                address_labels: vec![],
                cache: DerivationCache::default(),
            });
            account.default_derivation = DerivationType::Bech32;
            debug!(account = index, "added segwit derivation");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
