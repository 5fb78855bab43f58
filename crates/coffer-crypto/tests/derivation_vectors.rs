//! Cross-module derivation tests with fixed fixtures.
//!
//! Assertions never depend on process state or randomness: the same
//! credentials must produce the same node on every run, on every
//! machine (wallet recovery depends on it).

use coffer_crypto::ecdh::derive_shared_secret;
use coffer_crypto::metadata::derive_second_password_node;
use coffer_crypto::{aes, stretch};
use coffer_types::Credentials;
use k256::SecretKey;
use rand::rngs::OsRng;

/// Fixture credentials; `shared_key` is 32 hex chars as issued by the
/// server.
fn fixture_credentials() -> Credentials {
    Credentials::new(
        "22d57944-bb00-49e5-bc96-e2c31e0a0ff1",
        "42cf2bc0b13b4be5b1d2b6c6a2521400",
        "correct-horse",
    )
}

/// Recorded address for the fixture credentials. Any change to the
/// digest framing, chain-code anchor, or address encoding moves this
/// value and orphans deployed wallets.
const FIXTURE_ADDRESS: &str = "1579ggyaDTKYU5ZPGpKsXf2WiPZMfwgEwD";

#[test]
fn second_password_node_is_stable_across_invocations() {
    let credentials = fixture_credentials();

    let first = derive_second_password_node(&credentials).expect("fixture derives");
    assert_eq!(first.address(), FIXTURE_ADDRESS);

    // Re-derive many times; the address must never move.
    for _ in 0..16 {
        let again = derive_second_password_node(&credentials).expect("fixture derives");
        assert_eq!(again.address(), FIXTURE_ADDRESS);
    }
}

#[test]
fn typed_nodes_are_stable_and_disjoint() {
    let root = derive_second_password_node(&fixture_credentials()).expect("fixture derives");

    let a1 = root.derive(2).expect("type 2 derives");
    let a2 = root.derive(2).expect("type 2 derives");
    let b = root.derive(3).expect("type 3 derives");

    assert_eq!(a1.address(), a2.address());
    assert_ne!(a1.address(), b.address());
    assert_ne!(a1.address(), root.address());
}

#[test]
fn ecdh_key_drives_aes_roundtrip() {
    // One pairing exchange end to end at the primitive level: agree on
    // a key, encrypt on one side, decrypt on the other.
    let device = SecretKey::random(&mut OsRng);
    let browser = SecretKey::random(&mut OsRng);

    let device_side =
        derive_shared_secret(&device, &browser.public_key()).expect("agreement succeeds");
    let browser_side =
        derive_shared_secret(&browser, &device.public_key()).expect("agreement succeeds");

    let iv = [0x07u8; aes::BLOCK_LEN];
    let plaintext = br#"{"guid":"22d57944-bb00-49e5-bc96-e2c31e0a0ff1"}"#;

    let ciphertext = aes::encrypt(
        plaintext,
        device_side.as_bytes(),
        &iv,
        aes::AesOptions::default(),
    )
    .expect("encryption succeeds");

    let recovered = aes::decrypt(
        &ciphertext,
        browser_side.as_bytes(),
        &iv,
        aes::AesOptions::default(),
    )
    .expect("decryption succeeds");

    assert_eq!(recovered, plaintext);
}

#[test]
fn stretched_key_matches_between_encrypt_and_decrypt_paths() {
    // The payload engine stretches with the IV as salt on both paths;
    // both sides must land on the same AES key for any iteration count
    // the wrapper may carry.
    for iterations in [1u32, 10, 5000] {
        let iv = [0x5Au8; aes::BLOCK_LEN];
        let enc = stretch::stretch_password("correct-horse", &iv, iterations)
            .expect("stretch succeeds");
        let dec = stretch::stretch_password("correct-horse", &iv, iterations)
            .expect("stretch succeeds");
        assert_eq!(*enc, *dec);
    }
}
