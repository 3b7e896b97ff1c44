//! Turning a sane record into a [`SecretKey`]
//!
//! The record is consumed. Each step that produces secret bytes keeps them
//! in a self-zeroing buffer scoped to that step, so every exit path wipes
//! the password, the derived key and the unwrapped blob.

use crate::config::LoadConfig;
use crate::derive::{checksum_matches, derive_wrapping_key, xor_in_place};
use crate::password::{self, PasswordSource};
use crate::record::PrivateKeyRecord;
use crate::sanity::KeyShape;
use crate::secret::SecretKey;
use crate::{ErrorKind, KeyError, Result};
use asign_common::KeyLog;
use zeroize::Zeroize;

/// Recover the secret held by `record`
///
/// `source` is only consulted for [`KeyShape::Encrypted`] records.
///
/// # Errors
///
/// - `PasswordRequired` if the key is encrypted and `source` is `None`
/// - `Authentication` if the password is declined, overruns its buffer, or
///   the unwrapped secret does not match the stored checksum
/// - `KeyDerivation` if the KDF rejects its parameters
pub fn unpack(
    mut record: PrivateKeyRecord,
    shape: KeyShape,
    source: Option<&mut dyn PasswordSource>,
    config: &LoadConfig,
) -> Result<SecretKey> {
    let result = match shape {
        KeyShape::Plaintext => take_plaintext(&mut record, config),
        KeyShape::Encrypted => recover_encrypted(&mut record, source, config),
    };

    let id = record.id().unwrap_or_default();
    match &result {
        Ok(_) => KeyLog::log_key_operation("unpack", id, true),
        Err(e) => KeyLog::log_key_failure("unpack", id, failure_level(e.kind()), e.kind()),
    }
    result
}

/// Wrong passwords and missing sources are expected; everything else is not
fn failure_level(kind: ErrorKind) -> log::Level {
    match kind {
        ErrorKind::Authentication | ErrorKind::Configuration => log::Level::Warn,
        _ => log::Level::Error,
    }
}

fn take_plaintext(record: &mut PrivateKeyRecord, config: &LoadConfig) -> Result<SecretKey> {
    let id = record
        .id
        .as_deref()
        .ok_or_else(|| KeyError::inconsistent("key is missing `id`"))?;
    let blob = record
        .encrypted_blob
        .as_mut()
        .ok_or_else(|| KeyError::inconsistent("key is missing `data`"))?;

    let secret = SecretKey::from_parts(blob.as_slice(), id, config.lock_memory);
    blob.as_mut_slice().zeroize();
    secret
}

fn recover_encrypted(
    record: &mut PrivateKeyRecord,
    source: Option<&mut dyn PasswordSource>,
    config: &LoadConfig,
) -> Result<SecretKey> {
    let source = source.ok_or(KeyError::PasswordRequired)?;

    let (Some(salt), Some(rounds), Some(stored), Some(id)) = (
        record.salt.as_deref(),
        record.rounds,
        record.checksum.as_deref(),
        record.id.as_deref(),
    ) else {
        return Err(KeyError::inconsistent("encrypted key is incomplete"));
    };
    let blob = record
        .encrypted_blob
        .as_mut()
        .ok_or_else(|| KeyError::inconsistent("key is missing `data`"))?;

    let wrapping_key = {
        let password = password::read_password(source, config)?;
        derive_wrapping_key(password.as_bytes(), salt, rounds)?
    };

    xor_in_place(blob.as_mut_slice(), &wrapping_key);
    drop(wrapping_key);

    if !checksum_matches(blob.as_slice(), stored) {
        blob.as_mut_slice().zeroize();
        return Err(KeyError::authentication(
            "checksum mismatch (wrong password or corrupted key)",
        ));
    }

    let secret = SecretKey::from_parts(blob.as_slice(), id, config.lock_memory);
    blob.as_mut_slice().zeroize();
    secret
}
