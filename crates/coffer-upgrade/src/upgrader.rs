//! Upgrade orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use coffer_payload::Wrapper;
use coffer_types::{WalletUpgradeError, WalletVersion};

// ---------------------------------------------------------------------------
// WalletUpgradeWorkflow
// ---------------------------------------------------------------------------

/// One generation step of the upgrade pipeline.
#[async_trait]
pub trait WalletUpgradeWorkflow: Send + Sync {
    /// The generation this workflow upgrades *to*.
    fn target(&self) -> WalletVersion;

    /// Whether this workflow applies to the given wrapper.
    ///
    /// The orchestrator evaluates predicates once, against the wrapper
    /// it starts from, before any step runs. Predicates must therefore
    /// hold for every generation below the target (`version < target`),
    /// not just the immediately preceding one.
    fn should_perform_upgrade(&self, wrapper: &Wrapper) -> bool;

    /// Produces the upgraded wrapper. The input is consumed; on error
    /// nothing of it escapes.
    async fn upgrade(
        &self,
        wrapper: Wrapper,
        password: &str,
    ) -> Result<Wrapper, WalletUpgradeError>;
}

// ---------------------------------------------------------------------------
// WalletUpgrader
// ---------------------------------------------------------------------------

/// Runs the applicable upgrade workflows in order.
///
/// `latest` is injected rather than hard-coded so a pipeline can be
/// pointed at an intermediate generation under test; production
/// callers pass [`WalletVersion::LATEST`].
pub struct WalletUpgrader {
    workflows: Vec<Arc<dyn WalletUpgradeWorkflow>>,
    latest: WalletVersion,
}

impl WalletUpgrader {
    /// Creates an upgrader over an ordered workflow list.
    pub fn new(workflows: Vec<Arc<dyn WalletUpgradeWorkflow>>, latest: WalletVersion) -> Self {
        Self { workflows, latest }
    }

    /// Upgrades the wrapper through every applicable workflow.
    ///
    /// Workflows past `latest`, and workflows whose predicate rejects
    /// the starting wrapper, are dropped up front; the remainder run
    /// sequentially, each feeding the next. The first failure aborts
    /// the fold. Running the result through the upgrader again selects
    /// no workflows, so the operation is idempotent.
    pub async fn upgrade(
        &self,
        wrapper: Wrapper,
        password: &str,
    ) -> Result<Wrapper, WalletUpgradeError> {
        let pending: Vec<&Arc<dyn WalletUpgradeWorkflow>> = self
            .workflows
            .iter()
            .filter(|workflow| workflow.target() <= self.latest)
            .filter(|workflow| workflow.should_perform_upgrade(&wrapper))
            .collect();

        if pending.is_empty() {
            debug!(version = %wrapper.version, "wallet already current, no upgrade needed");
            return Ok(wrapper);
        }

        let mut current = wrapper;
        for workflow in pending {
            info!(
                from = %current.version,
                to = %workflow.target(),
                "running wallet upgrade workflow"
            );
            current = workflow.upgrade(current, password).await?;
        }

        info!(version = %current.version, "wallet upgrade pipeline complete");
        Ok(current)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
