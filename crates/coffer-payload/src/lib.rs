//! Versioned wallet payload codec for the Coffer wallet core.
//!
//! Converts between the wire representation of a wallet payload and
//! the in-memory [`Wrapper`]/[`WalletSnapshot`] pair:
//!
//! ```text
//! server response ── decode ──► wire wrapper ── decrypt ──► snapshot
//!                                                              │
//! persisted payload ◄── encode ── wire wrapper ◄── encrypt ────┘
//! ```
//!
//! # Modules
//!
//! - [`wallet`] — decrypted wallet snapshot JSON model
//! - [`wrapper`] — versioned envelope (in-memory and wire forms)
//! - [`response`] — server payload response envelope
//! - [`crypto`] — encrypt/decrypt engine (v1 legacy cascade, v2–v4)
//! - [`checksum`] — SHA-256 payload checksum

pub mod checksum;
pub mod crypto;
pub mod response;
pub mod wallet;
pub mod wrapper;

pub use wallet::WalletSnapshot;
pub use wrapper::{WalletPayloadWrapper, Wrapper};
