//! PBKDF2-HMAC-SHA1 password stretching for payload encryption.
//!
//! The iteration count is a per-wallet value carried inside the
//! payload wrapper and must be honored exactly: stretching with a
//! different count produces a *wrong key*, not an error, so no default
//! is ever substituted here.

use coffer_types::PayloadCryptoError;
use hmac::Hmac;
use sha1::Sha1;
use zeroize::Zeroizing;

/// Derived key length in bytes (256-bit AES key).
pub const STRETCHED_KEY_LEN: usize = 32;

/// Stretches a password into a 256-bit AES key.
///
/// For wallet payloads the salt is the AES IV (existing wire
/// behavior); the secure channel never calls this — it keys AES from
/// ECDH output directly.
///
/// # Errors
///
/// [`PayloadCryptoError::KeyDerivationFailed`] when `iterations` is
/// zero; the count comes from an untrusted wrapper, so a bad value
/// must surface as an error rather than abort.
pub fn stretch_password(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; STRETCHED_KEY_LEN]>, PayloadCryptoError> {
    if iterations == 0 {
        return Err(PayloadCryptoError::KeyDerivationFailed);
    }

    let mut output = [0u8; STRETCHED_KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha1>>(password.as_bytes(), salt, iterations, &mut output)
        .map_err(|_| PayloadCryptoError::KeyDerivationFailed)?;

    Ok(Zeroizing::new(output))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
