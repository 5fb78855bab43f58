//! Wallet payload encryption engine.
//!
//! Wire blob layout (all generations):
//!
//! ```text
//! base64( iv[16] ‖ ciphertext )
//! ```
//!
//! The IV doubles as the PBKDF2 salt, so the blob is self-contained:
//! password + blob is everything a client needs. Payloads of
//! generation ≥ 2 are always AES-256-CBC with ISO 10126 padding and
//! the iteration count recorded in the envelope. Generation 1 predates
//! the envelope; its parameters were never recorded, so decryption
//! walks a fixed cascade of historical mode/iteration pairs until one
//! yields a parseable wallet.

use rand::RngCore;

use coffer_crypto::aes::{self, AesBlockMode, AesOptions, AesPadding};
use coffer_crypto::stretch;
use coffer_types::{Credentials, PayloadCryptoError, PayloadDecodingError, WalletVersion};

use crate::checksum::payload_checksum;
use crate::response::WalletPayloadResponse;
use crate::wallet::WalletSnapshot;
use crate::wrapper::{WalletPayloadWrapper, Wrapper};

/// Iteration count assumed first when decrypting a legacy v1 blob.
pub const V1_DEFAULT_ITERATIONS: u32 = 10;

/// The historical v1 cipher configurations, in the order they are
/// attempted. The order is load-bearing: it mirrors the sequence in
/// which production clients shipped these modes.
const V1_CASCADE: [(u32, AesOptions); 4] = [
    (
        V1_DEFAULT_ITERATIONS,
        AesOptions {
            block_mode: AesBlockMode::Cbc,
            padding: AesPadding::Iso10126,
        },
    ),
    (
        1,
        AesOptions {
            block_mode: AesBlockMode::Ofb,
            padding: AesPadding::None,
        },
    ),
    (
        1,
        AesOptions {
            block_mode: AesBlockMode::Ofb,
            padding: AesPadding::Iso7816,
        },
    ),
    (
        1,
        AesOptions {
            block_mode: AesBlockMode::Cbc,
            padding: AesPadding::Iso10126,
        },
    ),
];

// ---------------------------------------------------------------------------
// Blob primitives
// ---------------------------------------------------------------------------

/// Decrypts a `base64(iv ‖ ciphertext)` blob with a stretched password.
pub fn decrypt_blob(
    blob: &str,
    password: &str,
    iterations: u32,
    options: AesOptions,
) -> Result<Vec<u8>, PayloadCryptoError> {
    use base64::Engine;

    let raw = base64::engine::general_purpose::STANDARD
        .decode(blob.trim())
        .map_err(|_| PayloadCryptoError::DecodingFailed)?;
    if raw.len() <= aes::BLOCK_LEN {
        return Err(PayloadCryptoError::DecodingFailed);
    }

    let (iv, ciphertext) = raw.split_at(aes::BLOCK_LEN);
    let mut iv_block = [0u8; aes::BLOCK_LEN];
    iv_block.copy_from_slice(iv);

    let key = stretch::stretch_password(password, &iv_block, iterations)?;
    aes::decrypt(ciphertext, &key, &iv_block, options)
}

/// Encrypts a payload into a `base64(iv ‖ ciphertext)` blob.
///
/// Always emits the current scheme (CBC, ISO 10126); legacy modes are
/// decrypt-only.
pub fn encrypt_blob(
    plaintext: &[u8],
    password: &str,
    iterations: u32,
) -> Result<String, PayloadCryptoError> {
    use base64::Engine;

    let mut iv = [0u8; aes::BLOCK_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let key = stretch::stretch_password(password, &iv, iterations)?;
    let ciphertext = aes::encrypt(plaintext, &key, &iv, AesOptions::default())?;

    let mut blob = Vec::with_capacity(iv.len() + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    Ok(base64::engine::general_purpose::STANDARD.encode(blob))
}

// ---------------------------------------------------------------------------
// Envelope decryption
// ---------------------------------------------------------------------------

/// Decrypts a versioned wire envelope into an in-memory wrapper.
pub fn decrypt_wrapper(
    envelope: &WalletPayloadWrapper,
    password: &str,
) -> Result<Wrapper, PayloadCryptoError> {
    let version = WalletVersion::try_from(envelope.version)?;
    let plaintext = decrypt_blob(
        &envelope.payload,
        password,
        envelope.pbkdf2_iterations,
        AesOptions::default(),
    )?;
    let wallet = parse_snapshot(&plaintext)?;
    Ok(Wrapper::new(version, envelope.pbkdf2_iterations, wallet))
}

/// Decrypts a legacy v1 blob by walking the historical cipher cascade.
///
/// Each configuration that decrypts cleanly is only accepted if the
/// plaintext parses as a wallet snapshot; OFB decryption in particular
/// "succeeds" under any key, producing garbage that only the parse
/// step can reject.
pub fn decrypt_v1_payload(blob: &str, password: &str) -> Result<Wrapper, PayloadCryptoError> {
    decrypt_v1_cascade(blob, password).map(|(wrapper, _)| wrapper)
}

/// Cascade walk that also hands back the winning plaintext, so callers
/// can verify a server checksum against the exact decrypted bytes.
fn decrypt_v1_cascade(
    blob: &str,
    password: &str,
) -> Result<(Wrapper, Vec<u8>), PayloadCryptoError> {
    for (iterations, options) in V1_CASCADE {
        let plaintext = match decrypt_blob(blob, password, iterations, options) {
            Ok(plaintext) => plaintext,
            Err(_) => continue,
        };
        if let Ok(wallet) = parse_snapshot(&plaintext) {
            let wrapper = Wrapper::new(WalletVersion::V1, iterations, wallet);
            return Ok((wrapper, plaintext));
        }
    }
    Err(PayloadCryptoError::FailedToDecryptV1Payload)
}

/// Decrypts a raw payload string of any supported generation.
///
/// Generation ≥ 2 payloads are JSON envelopes; generation 1 payloads
/// are bare base64 blobs. The envelope parse disambiguates: anything
/// that is not a valid envelope falls through to the v1 cascade.
pub fn decrypt_wallet(raw: &str, password: &str) -> Result<Wrapper, PayloadCryptoError> {
    match WalletPayloadWrapper::decode(Some(raw)) {
        Ok(envelope) => decrypt_wrapper(&envelope, password),
        Err(_) => decrypt_v1_payload(raw, password),
    }
}

// ---------------------------------------------------------------------------
// Open / seal with checksum
// ---------------------------------------------------------------------------

/// Decrypts an envelope and verifies the plaintext checksum.
///
/// `expected_checksum` comes from the server response; `None` skips
/// verification (the server omits the checksum for legacy wallets).
pub fn open_wrapper(
    envelope: &WalletPayloadWrapper,
    password: &str,
    expected_checksum: Option<&str>,
) -> Result<Wrapper, PayloadCryptoError> {
    let version = WalletVersion::try_from(envelope.version)?;
    let plaintext = decrypt_blob(
        &envelope.payload,
        password,
        envelope.pbkdf2_iterations,
        AesOptions::default(),
    )?;

    if let Some(expected) = expected_checksum {
        let computed = payload_checksum(&plaintext);
        if computed != expected {
            return Err(PayloadCryptoError::ChecksumMismatch {
                expected: expected.to_owned(),
                computed,
            });
        }
    }

    let wallet = parse_snapshot(&plaintext)?;
    Ok(Wrapper::new(version, envelope.pbkdf2_iterations, wallet))
}

/// Decodes a server response and decrypts its payload in one step.
///
/// The checksum recorded in the response is verified against the
/// decrypted plaintext on every generation, including the v1 cascade;
/// a mismatch is a hard failure. An absent payload (second factor
/// still pending) surfaces as a `MissingRawInput` decoding error, not
/// as corrupt data. Server metadata (checksum, language, pubkey sync
/// flag) is carried onto the returned wrapper.
pub fn decode_and_decrypt(
    response: &WalletPayloadResponse,
    credentials: &Credentials,
) -> Result<Wrapper, PayloadCryptoError> {
    let raw = response
        .payload
        .as_deref()
        .ok_or(PayloadDecodingError::MissingRawInput)?;

    let mut wrapper = match WalletPayloadWrapper::decode(Some(raw)) {
        Ok(envelope) => open_wrapper(
            &envelope,
            &credentials.password,
            response.payload_checksum.as_deref(),
        )?,
        Err(_) => {
            let (wrapper, plaintext) = decrypt_v1_cascade(raw, &credentials.password)?;
            if let Some(expected) = response.payload_checksum.as_deref() {
                let computed = payload_checksum(&plaintext);
                if computed != expected {
                    return Err(PayloadCryptoError::ChecksumMismatch {
                        expected: expected.to_owned(),
                        computed,
                    });
                }
            }
            wrapper
        }
    };

    wrapper.payload_checksum = response.payload_checksum.clone();
    wrapper.language = response.language.clone();
    wrapper.sync_pubkeys = response.should_sync_pub_keys;
    Ok(wrapper)
}

/// An encrypted envelope together with the checksum of the plaintext
/// it was sealed from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SealedPayload {
    /// The wire envelope, ready for upload.
    pub envelope: WalletPayloadWrapper,
    /// Lowercase hex SHA-256 of the plaintext snapshot JSON.
    pub checksum: String,
}

/// Serializes and encrypts a wrapper into a wire envelope.
pub fn seal_wrapper(wrapper: &Wrapper, password: &str) -> Result<SealedPayload, PayloadCryptoError> {
    let plaintext =
        serde_json::to_vec(&wrapper.wallet).map_err(|err| PayloadCryptoError::MalformedWallet {
            reason: err.to_string(),
        })?;
    let checksum = payload_checksum(&plaintext);
    let payload = encrypt_blob(&plaintext, password, wrapper.pbkdf2_iterations)?;

    Ok(SealedPayload {
        envelope: WalletPayloadWrapper {
            pbkdf2_iterations: wrapper.pbkdf2_iterations,
            version: wrapper.version.as_u32(),
            payload,
        },
        checksum,
    })
}

fn parse_snapshot(plaintext: &[u8]) -> Result<WalletSnapshot, PayloadCryptoError> {
    serde_json::from_slice(plaintext).map_err(|err| PayloadCryptoError::MalformedWallet {
        reason: err.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
