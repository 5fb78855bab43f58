//! Remote wallet synchronization seam.

use async_trait::async_trait;

use coffer_payload::Wrapper;
use coffer_types::WalletSyncError;

/// Persists an upgraded wrapper to the remote wallet service.
///
/// The upgrader treats this as opaque: it neither retries nor
/// inspects the failure beyond aborting the pipeline. Implementations
/// own their transport, authentication, and retry policy.
#[async_trait]
pub trait WalletSyncing: Send + Sync {
    /// Encrypts and uploads the wrapper under the given password.
    async fn sync(&self, wrapper: &Wrapper, password: &str) -> Result<(), WalletSyncError>;
}
