//! AES-256 block cipher helpers for wallet payloads and pairing
//! messages.
//!
//! The current payload generation (v2+) and the secure channel both
//! use CBC with ISO 10126 padding. The legacy v1 payload generation
//! additionally shipped OFB variants with no padding or ISO 7816-4
//! padding; those modes exist solely so v1 wallets remain readable.
//!
//! Keys are always 256-bit; the IV is always one 16-byte block and is
//! carried in front of the ciphertext by the callers.

use cipher::block_padding::{Iso10126, NoPadding};
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};
use coffer_types::PayloadCryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256Ofb = ofb::Ofb<aes::Aes256>;

/// AES block and IV size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Key size in bytes (AES-256).
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// AesOptions
// ---------------------------------------------------------------------------

/// Block mode for an AES operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AesBlockMode {
    /// Cipher block chaining. Used by every payload generation ≥ v2.
    Cbc,
    /// Output feedback (stream mode). Legacy v1 payloads only.
    Ofb,
}

/// Padding scheme for an AES operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AesPadding {
    /// ISO 10126: fill bytes, final byte is the pad length.
    Iso10126,
    /// ISO/IEC 7816-4: a 0x80 marker followed by zeros.
    Iso7816,
    /// No padding; plaintext must already be block-aligned (OFB only
    /// in practice).
    None,
}

/// Mode/padding pair selecting one concrete cipher configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AesOptions {
    /// Block mode.
    pub block_mode: AesBlockMode,
    /// Padding scheme.
    pub padding: AesPadding,
}

impl Default for AesOptions {
    fn default() -> Self {
        Self {
            block_mode: AesBlockMode::Cbc,
            padding: AesPadding::Iso10126,
        }
    }
}

// ---------------------------------------------------------------------------
// Encrypt / decrypt
// ---------------------------------------------------------------------------

/// Encrypts `plaintext` with AES-256 under the given options.
///
/// The returned ciphertext does not include the IV; callers prepend it
/// when assembling the wire blob.
pub fn encrypt(
    plaintext: &[u8],
    key: &[u8; KEY_LEN],
    iv: &[u8; BLOCK_LEN],
    options: AesOptions,
) -> Result<Vec<u8>, PayloadCryptoError> {
    match options.block_mode {
        AesBlockMode::Cbc => {
            let cipher = Aes256CbcEnc::new(key.into(), iv.into());
            match options.padding {
                AesPadding::Iso10126 => {
                    Ok(cipher.encrypt_padded_vec_mut::<Iso10126>(plaintext))
                }
                AesPadding::None => {
                    if plaintext.len() % BLOCK_LEN != 0 {
                        return Err(PayloadCryptoError::EncryptionFailed);
                    }
                    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(plaintext))
                }
                AesPadding::Iso7816 => {
                    let padded = pad_iso7816(plaintext);
                    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(&padded))
                }
            }
        }
        AesBlockMode::Ofb => {
            let mut buffer = match options.padding {
                AesPadding::Iso10126 => pad_iso10126(plaintext),
                AesPadding::Iso7816 => pad_iso7816(plaintext),
                AesPadding::None => plaintext.to_vec(),
            };
            let mut cipher = Aes256Ofb::new(key.into(), iv.into());
            cipher.apply_keystream(&mut buffer);
            Ok(buffer)
        }
    }
}

/// Decrypts `ciphertext` with AES-256 under the given options.
///
/// # Errors
///
/// [`PayloadCryptoError::DecryptionFailed`] on invalid padding or a
/// misaligned CBC ciphertext. A wrong key usually surfaces here, or at
/// the caller's UTF-8 check on the produced plaintext.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8; KEY_LEN],
    iv: &[u8; BLOCK_LEN],
    options: AesOptions,
) -> Result<Vec<u8>, PayloadCryptoError> {
    match options.block_mode {
        AesBlockMode::Cbc => {
            let cipher = Aes256CbcDec::new(key.into(), iv.into());
            match options.padding {
                AesPadding::Iso10126 => cipher
                    .decrypt_padded_vec_mut::<Iso10126>(ciphertext)
                    .map_err(|_| PayloadCryptoError::DecryptionFailed),
                AesPadding::None => cipher
                    .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                    .map_err(|_| PayloadCryptoError::DecryptionFailed),
                AesPadding::Iso7816 => {
                    let padded = cipher
                        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                        .map_err(|_| PayloadCryptoError::DecryptionFailed)?;
                    unpad_iso7816(padded)
                }
            }
        }
        AesBlockMode::Ofb => {
            let mut buffer = ciphertext.to_vec();
            let mut cipher = Aes256Ofb::new(key.into(), iv.into());
            cipher.apply_keystream(&mut buffer);
            match options.padding {
                AesPadding::Iso10126 => unpad_iso10126(buffer),
                AesPadding::Iso7816 => unpad_iso7816(buffer),
                AesPadding::None => Ok(buffer),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Manual padding (stream-mode paths)
// ---------------------------------------------------------------------------

/// ISO/IEC 7816-4: append 0x80, then zeros up to the block boundary.
fn pad_iso7816(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - (data.len() % BLOCK_LEN);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.push(0x80);
    padded.resize(data.len() + pad_len, 0x00);
    padded
}

/// ISO/IEC 7816-4 unpad: strip trailing zeros, then the 0x80 marker.
fn unpad_iso7816(mut data: Vec<u8>) -> Result<Vec<u8>, PayloadCryptoError> {
    while let Some(&byte) = data.last() {
        data.pop();
        match byte {
            0x00 => continue,
            0x80 => return Ok(data),
            _ => break,
        }
    }
    Err(PayloadCryptoError::DecryptionFailed)
}

/// ISO 10126: fill bytes, final byte records the pad length.
fn pad_iso10126(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - (data.len() % BLOCK_LEN);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len - 1, 0x00);
    padded.push(pad_len as u8);
    padded
}

/// ISO 10126 unpad: the final byte is the pad length.
fn unpad_iso10126(data: Vec<u8>) -> Result<Vec<u8>, PayloadCryptoError> {
    let pad_len = *data.last().ok_or(PayloadCryptoError::DecryptionFailed)? as usize;
    if pad_len == 0 || pad_len > BLOCK_LEN || pad_len > data.len() {
        return Err(PayloadCryptoError::DecryptionFailed);
    }
    let mut data = data;
    data.truncate(data.len() - pad_len);
    Ok(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
