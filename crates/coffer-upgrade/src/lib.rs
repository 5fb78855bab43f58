//! Sequential wallet upgrade pipeline.
//!
//! A wallet fetched from the server may be several payload generations
//! behind. The [`WalletUpgrader`] walks it forward one generation at a
//! time:
//!
//! ```text
//! v1 ── Version2Workflow ──► v2 ── Version3Workflow ──► v3 ── Version4Workflow ──► v4
//! ```
//!
//! Each workflow consumes a wrapper and produces a new one; the input
//! is never mutated, so a failure at any step leaves the caller
//! holding a wrapper that is valid at whatever generation the pipeline
//! last completed — never a half-migrated one.
//!
//! Remote persistence happens through the [`WalletSyncing`] seam after
//! each successful step, so a crash between steps loses at most one
//! generation of progress.

pub mod sync;
pub mod upgrader;
pub mod workflows;

pub use sync::WalletSyncing;
pub use upgrader::{WalletUpgradeWorkflow, WalletUpgrader};
pub use workflows::{
    EntropyProvider, OsEntropy, Version2Workflow, Version3Workflow, Version4Workflow,
};
