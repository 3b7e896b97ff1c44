//! Structural check of a parsed private key record

use crate::config::PBKDF_ALG;
use crate::record::PrivateKeyRecord;
use crate::{KeyError, Result};

/// The two usable shapes of a private key record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// Secret is wrapped with a password-derived key
    Encrypted,
    /// Secret is stored as is
    Plaintext,
}

/// Decide which shape, if any, `record` has
///
/// # Errors
///
/// Returns `Inconsistent` when the record is neither a complete encrypted
/// key nor a complete plaintext key, or its version is not 1.
pub fn check(record: &PrivateKeyRecord, min_rounds: u32) -> Result<KeyShape> {
    if record.version != Some(1) {
        return Err(KeyError::inconsistent(match record.version {
            Some(v) => format!("unsupported version {v}"),
            None => "missing version".to_string(),
        }));
    }

    if record.pbkdf_algorithm.as_deref() == Some(PBKDF_ALG) {
        let rounds = record.rounds.unwrap_or(0);
        if rounds < min_rounds {
            return Err(KeyError::inconsistent(format!(
                "{rounds} KDF rounds is below the minimum of {min_rounds}"
            )));
        }
        let missing = [
            ("salt", record.salt.is_none()),
            ("id", record.id.is_none()),
            ("data", record.encrypted_blob.is_none()),
            ("checksum", record.checksum.is_none()),
        ];
        if let Some((name, _)) = missing.iter().find(|(_, absent)| *absent) {
            return Err(KeyError::inconsistent(format!(
                "encrypted key is missing `{name}`"
            )));
        }
        return Ok(KeyShape::Encrypted);
    }

    if record.id.is_none() || record.encrypted_blob.is_none() {
        return Err(KeyError::inconsistent("key is missing `id` or `data`"));
    }
    Ok(KeyShape::Plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DIGEST_LEN, ID_LEN, MIN_ROUNDS, SALT_LEN, SECRET_LEN};
    use zeroize::Zeroizing;

    fn bytes(len: usize) -> Option<Zeroizing<Vec<u8>>> {
        Some(Zeroizing::new(vec![7u8; len]))
    }

    fn plaintext() -> PrivateKeyRecord {
        PrivateKeyRecord {
            version: Some(1),
            id: bytes(ID_LEN),
            encrypted_blob: bytes(SECRET_LEN),
            ..PrivateKeyRecord::default()
        }
    }

    fn encrypted() -> PrivateKeyRecord {
        PrivateKeyRecord {
            pbkdf_algorithm: Some(PBKDF_ALG.to_string()),
            rounds: Some(MIN_ROUNDS),
            salt: bytes(SALT_LEN),
            checksum: bytes(DIGEST_LEN),
            ..plaintext()
        }
    }

    #[test]
    fn test_complete_records_are_sane() {
        assert_eq!(check(&plaintext(), MIN_ROUNDS).ok(), Some(KeyShape::Plaintext));
        assert_eq!(check(&encrypted(), MIN_ROUNDS).ok(), Some(KeyShape::Encrypted));
    }

    #[test]
    fn test_version_must_be_one() {
        let mut record = plaintext();
        record.version = Some(2);
        assert!(check(&record, MIN_ROUNDS).is_err());
        record.version = None;
        assert!(check(&record, MIN_ROUNDS).is_err());
    }

    #[test]
    fn test_encrypted_requires_every_field() {
        for strip in 0..4 {
            let mut record = encrypted();
            match strip {
                0 => record.salt = None,
                1 => record.id = None,
                2 => record.encrypted_blob = None,
                _ => record.checksum = None,
            }
            assert!(check(&record, MIN_ROUNDS).is_err(), "case {strip}");
        }
    }

    #[test]
    fn test_encrypted_requires_enough_rounds() {
        let mut record = encrypted();
        record.rounds = Some(MIN_ROUNDS - 1);
        assert!(check(&record, MIN_ROUNDS).is_err());
        record.rounds = None;
        assert!(check(&record, MIN_ROUNDS).is_err());
        record.rounds = Some(1);
        assert_eq!(check(&record, 1).ok(), Some(KeyShape::Encrypted));
    }

    #[test]
    fn test_unknown_kdf_is_treated_as_plaintext() {
        let mut record = plaintext();
        record.pbkdf_algorithm = Some("scrypt".to_string());
        assert_eq!(check(&record, MIN_ROUNDS).ok(), Some(KeyShape::Plaintext));
    }

    #[test]
    fn test_plaintext_requires_id_and_data() {
        let mut record = plaintext();
        record.id = None;
        assert!(check(&record, MIN_ROUNDS).is_err());
        let mut record = plaintext();
        record.encrypted_blob = None;
        assert!(check(&record, MIN_ROUNDS).is_err());
    }
}
