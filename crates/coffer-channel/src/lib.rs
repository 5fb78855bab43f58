//! Secure-channel pairing between a wallet device and a browser peer.
//!
//! Pairing starts from a QR code carrying the peer's channel id and
//! compressed secp256k1 public key. The device opens a
//! [`PairingChannel`] with a fresh key, derives a shared secret via
//! ECDH, and exchanges AES-encrypted JSON messages:
//!
//! ```text
//! peer QR ──► PairingChannel::open ──► build_message ──► PairingResponse
//!                                        (handshake, login, …)
//! ```
//!
//! The device key is generated per pairing attempt and never reused; a
//! failed attempt is abandoned, not retried on the same channel.

pub mod channel;
pub mod wire;

pub use channel::{build_message, decrypt_message, PairingChannel};
pub use wire::{EmptyResponse, LoginMessage, PairingCode, PairingHandshake, PairingResponse};
