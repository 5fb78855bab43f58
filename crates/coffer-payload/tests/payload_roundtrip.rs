//! Full-path payload tests: server response JSON in, wrapper out, and
//! back again.

use coffer_payload::crypto::{open_wrapper, seal_wrapper};
use coffer_payload::response::WalletPayloadResponse;
use coffer_payload::wallet::{WalletOptions, WalletSnapshot};
use coffer_payload::Wrapper;
use coffer_types::WalletVersion;

const PASSWORD: &str = "correct-horse";

fn snapshot() -> WalletSnapshot {
    WalletSnapshot {
        guid: "22d57944-bb00-49e5-bc96-e2c31e0a0ff1".into(),
        shared_key: "42cf2bc0b13b4be5b1d2b6c6a2521400".into(),
        double_encryption: false,
        dpasswordhash: None,
        metadata_hd_node: None,
        options: WalletOptions::default(),
        keys: vec![],
        hd_wallets: vec![],
    }
}

#[test]
fn response_to_wrapper_and_back() {
    // Seal a wallet the way an upload would, then embed it in a
    // response body the way the server returns it.
    let wrapper = Wrapper::new(WalletVersion::V4, 5000, snapshot());
    let sealed = seal_wrapper(&wrapper, PASSWORD).expect("seal succeeds");
    let embedded = sealed.envelope.encode().expect("envelope encodes");

    let body = serde_json::json!({
        "guid": "22d57944-bb00-49e5-bc96-e2c31e0a0ff1",
        "authType": 0,
        "shouldSyncPubKeys": false,
        "payload_checksum": sealed.checksum,
        "payload": embedded,
    });
    let response: WalletPayloadResponse =
        serde_json::from_value(body).expect("response parses");

    let envelope = response.wrapper().expect("embedded envelope decodes");
    let opened = open_wrapper(
        &envelope,
        PASSWORD,
        response.payload_checksum.as_deref(),
    )
    .expect("payload opens");

    assert_eq!(opened, wrapper);
}

#[test]
fn checksum_tracks_plaintext_not_ciphertext() {
    // Sealing the same wrapper twice produces different ciphertext
    // (fresh IV) but the identical plaintext checksum.
    let wrapper = Wrapper::new(WalletVersion::V4, 5000, snapshot());
    let first = seal_wrapper(&wrapper, PASSWORD).expect("seal succeeds");
    let second = seal_wrapper(&wrapper, PASSWORD).expect("seal succeeds");

    assert_ne!(first.envelope.payload, second.envelope.payload);
    assert_eq!(first.checksum, second.checksum);
}

#[test]
fn flipped_ciphertext_byte_never_opens_clean() {
    use base64::Engine;

    let wrapper = Wrapper::new(WalletVersion::V4, 5000, snapshot());
    let mut sealed = seal_wrapper(&wrapper, PASSWORD).expect("seal succeeds");

    // Corrupt one byte in the middle of the ciphertext body.
    let mut raw = base64::engine::general_purpose::STANDARD
        .decode(&sealed.envelope.payload)
        .expect("blob is valid base64");
    let middle = raw.len() / 2;
    raw[middle] ^= 0x01;
    sealed.envelope.payload = base64::engine::general_purpose::STANDARD.encode(raw);

    // CBC corruption surfaces as a padding/parse failure or, if the
    // plaintext happens to survive both, as a checksum mismatch. It
    // must never come back as a clean wallet.
    let result = open_wrapper(&sealed.envelope, PASSWORD, Some(&sealed.checksum));
    assert!(result.is_err());
}

#[test]
fn reseal_under_new_iterations_still_opens() {
    // An upgrade rewrites the iteration count; the resealed payload
    // must open under the new parameters alone.
    let wrapper = Wrapper::new(WalletVersion::V2, 10, snapshot());
    let upgraded = Wrapper::new(WalletVersion::V2, 5000, wrapper.wallet.clone());

    let sealed = seal_wrapper(&upgraded, PASSWORD).expect("seal succeeds");
    assert_eq!(sealed.envelope.pbkdf2_iterations, 5000);

    let opened =
        open_wrapper(&sealed.envelope, PASSWORD, Some(&sealed.checksum)).expect("opens");
    assert_eq!(opened.pbkdf2_iterations, 5000);
    assert_eq!(opened.wallet, wrapper.wallet);
}
