//! Producing private key containers
//!
//! The inverse of the loader: wraps a secret under a password and writes
//! the record in the `name: value` container format.

use crate::config::{
    WriteConfig, ID_LEN, MIN_ROUNDS, PBKDF_ALG, PRIVKEY_MAGIC, SALT_LEN, SECRET_LEN,
};
use crate::derive::{checksum, derive_wrapping_key, xor_in_place};
use crate::record::PrivateKeyRecord;
use crate::sanity;
use crate::{KeyError, Result};
use rand::RngCore;
use std::io::Write;
use zeroize::Zeroizing;

/// Build a password-protected record for `secret`
///
/// # Errors
///
/// Returns `InvalidFormat` for a wrongly sized secret or id, and
/// `KeyDerivation` for an empty password or zero rounds.
pub fn wrap_secret(
    secret: &[u8],
    id: &[u8],
    password: &[u8],
    config: &WriteConfig,
) -> Result<PrivateKeyRecord> {
    let mut record = plaintext_record(secret, id)?;
    if password.is_empty() {
        return Err(KeyError::KeyDerivation("password is empty".into()));
    }
    if config.rounds < MIN_ROUNDS {
        log::warn!(
            "Wrapping key with {} rounds; loaders require {MIN_ROUNDS} by default",
            config.rounds
        );
    }

    let mut salt = Zeroizing::new(vec![0u8; SALT_LEN]);
    rand::rng().fill_bytes(salt.as_mut_slice());

    let wrapping_key = derive_wrapping_key(password, &salt, config.rounds)?;
    let digest = checksum(secret);

    if let Some(blob) = record.encrypted_blob.as_mut() {
        xor_in_place(blob.as_mut_slice(), &wrapping_key);
    }
    record.pbkdf_algorithm = Some(PBKDF_ALG.to_string());
    record.rounds = Some(config.rounds);
    record.salt = Some(salt);
    record.checksum = Some(Zeroizing::new(digest.to_vec()));
    Ok(record)
}

/// Build an unprotected record for `secret`
///
/// # Errors
///
/// Returns `InvalidFormat` for a wrongly sized secret or id.
pub fn plaintext_record(secret: &[u8], id: &[u8]) -> Result<PrivateKeyRecord> {
    if secret.len() != SECRET_LEN {
        return Err(KeyError::format(format!("secret must be {SECRET_LEN} bytes")));
    }
    if id.len() != ID_LEN {
        return Err(KeyError::format(format!("key id must be {ID_LEN} bytes")));
    }
    Ok(PrivateKeyRecord {
        version: Some(1),
        id: Some(Zeroizing::new(id.to_vec())),
        encrypted_blob: Some(Zeroizing::new(secret.to_vec())),
        ..PrivateKeyRecord::default()
    })
}

/// Write `record` as a private key container
///
/// # Errors
///
/// Returns `Inconsistent` if the record would not load back, and `Io` if
/// writing fails.
pub fn write_private_key<W: Write>(record: &PrivateKeyRecord, mut out: W) -> Result<()> {
    sanity::check(record, 1)?;

    writeln!(out, "{PRIVKEY_MAGIC}")?;
    if let Some(version) = record.version {
        writeln!(out, "version: {version}")?;
    }
    if let Some(blob) = record.blob() {
        let mut encoded = Zeroizing::new(vec![0u8; blob.len() * 2]);
        hex::encode_to_slice(blob, encoded.as_mut_slice())
            .map_err(|_| KeyError::format("secret blob could not be hex-encoded"))?;
        out.write_all(b"data: ")?;
        out.write_all(&encoded)?;
        out.write_all(b"\n")?;
    }
    if let Some(id) = record.id() {
        writeln!(out, "id: {}", hex::encode(id))?;
    }
    if let Some(kdf) = record.pbkdf_algorithm() {
        writeln!(out, "kdf: {kdf}")?;
    }
    if let Some(rounds) = record.rounds {
        writeln!(out, "rounds: {rounds}")?;
    }
    if let Some(salt) = record.salt() {
        writeln!(out, "salt: {}", hex::encode(salt))?;
    }
    if let Some(checksum) = record.checksum() {
        writeln!(out, "checksum: {}", hex::encode(checksum))?;
    }
    out.flush()?;
    Ok(())
}
