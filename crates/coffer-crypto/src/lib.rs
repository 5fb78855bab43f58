//! Cryptographic primitives for the Coffer wallet core.
//!
//! This crate is the **sole** location for raw cryptographic
//! operations. Payload and pairing crates compose these primitives but
//! never touch curves, ciphers, or KDFs directly.
//!
//! # Modules
//!
//! - [`metadata`] — credential-derived metadata nodes (second-password
//!   node and per-type hardened children)
//! - [`hd`] — hardened BIP32 child derivation over secp256k1
//! - [`deriver`] — BIP39 mnemonic → extended Bitcoin keypair
//! - [`ecdh`] — secp256k1 Diffie-Hellman for secure-channel pairing
//! - [`aes`] — AES-256 CBC/OFB helpers with legacy padding schemes
//! - [`stretch`] — PBKDF2-HMAC-SHA1 password stretching
//!
//! Every function in [`metadata`], [`hd`], [`deriver`], and [`ecdh`]
//! is deterministic: identical inputs yield byte-identical outputs.
//! Randomness enters only through callers (IVs, ephemeral keys).

pub mod aes;
pub mod deriver;
pub mod ecdh;
pub mod hd;
pub mod metadata;
pub mod stretch;
