//! Password wrapping primitives
//!
//! PBKDF2-HMAC-SHA256 stretches the password into a key as long as the
//! secret, the secret is XORed with it, and BLAKE2b-512 of the plaintext
//! secret authenticates the result.

use crate::config::{DIGEST_LEN, SECRET_LEN};
use crate::{KeyError, Result};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::num::NonZeroU32;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Derive the `SECRET_LEN`-byte wrapping key
///
/// # Errors
///
/// Returns `KeyDerivation` if `rounds` is zero or the salt is empty.
pub(crate) fn derive_wrapping_key(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
) -> Result<Zeroizing<Vec<u8>>> {
    let rounds = NonZeroU32::new(rounds)
        .ok_or_else(|| KeyError::KeyDerivation("PBKDF2 rounds must be non-zero".into()))?;
    if salt.is_empty() {
        return Err(KeyError::KeyDerivation("PBKDF2 salt is empty".into()));
    }

    let mut key = Zeroizing::new(vec![0u8; SECRET_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, rounds.get(), key.as_mut_slice());
    Ok(key)
}

/// XOR `blob` with `key` byte for byte
pub(crate) fn xor_in_place(blob: &mut [u8], key: &[u8]) {
    for (b, k) in blob.iter_mut().zip(key) {
        *b ^= k;
    }
}

/// BLAKE2b-512 of the plaintext secret
pub(crate) fn checksum(secret: &[u8]) -> [u8; DIGEST_LEN] {
    let hash = blake2b_simd::Params::new()
        .hash_length(DIGEST_LEN)
        .hash(secret);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Full-length constant-time comparison against a stored checksum
pub(crate) fn checksum_matches(secret: &[u8], expected: &[u8]) -> bool {
    let actual = checksum(secret);
    actual[..].ct_eq(expected).into()
}
