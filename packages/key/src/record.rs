//! In-progress private key record

use std::fmt;
use zeroize::Zeroizing;

/// Fields collected from one private key container
///
/// Every binary field lives in a self-zeroing buffer, so dropping a record
/// on any path wipes the blob, salt and checksum it held.
#[derive(Default, PartialEq, Eq)]
pub struct PrivateKeyRecord {
    pub(crate) version: Option<u32>,
    pub(crate) pbkdf_algorithm: Option<String>,
    pub(crate) rounds: Option<u32>,
    pub(crate) salt: Option<Zeroizing<Vec<u8>>>,
    pub(crate) id: Option<Zeroizing<Vec<u8>>>,
    pub(crate) encrypted_blob: Option<Zeroizing<Vec<u8>>>,
    pub(crate) checksum: Option<Zeroizing<Vec<u8>>>,
}

impl PrivateKeyRecord {
    /// Empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Container format version, if present
    #[must_use]
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// KDF name, if present
    #[must_use]
    pub fn pbkdf_algorithm(&self) -> Option<&str> {
        self.pbkdf_algorithm.as_deref()
    }

    /// KDF rounds, if present
    #[must_use]
    pub fn rounds(&self) -> Option<u32> {
        self.rounds
    }

    /// KDF salt, if present
    #[must_use]
    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_ref().map(|s| s.as_slice())
    }

    /// Key identifier, if present
    #[must_use]
    pub fn id(&self) -> Option<&[u8]> {
        self.id.as_ref().map(|s| s.as_slice())
    }

    /// Stored checksum of the plaintext secret, if present
    #[must_use]
    pub fn checksum(&self) -> Option<&[u8]> {
        self.checksum.as_ref().map(|s| s.as_slice())
    }

    /// Whether the record carries a secret blob
    #[must_use]
    pub fn has_blob(&self) -> bool {
        self.encrypted_blob.is_some()
    }

    pub(crate) fn blob(&self) -> Option<&[u8]> {
        self.encrypted_blob.as_ref().map(|s| s.as_slice())
    }
}

impl fmt::Debug for PrivateKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyRecord")
            .field("version", &self.version)
            .field("pbkdf_algorithm", &self.pbkdf_algorithm)
            .field("rounds", &self.rounds)
            .field("salt", &self.salt.as_ref().map(|s| hex::encode(s.as_slice())))
            .field("id", &self.id.as_ref().map(|s| hex::encode(s.as_slice())))
            .field("encrypted_blob", &self.encrypted_blob.as_ref().map(|_| "***"))
            .field("checksum", &self.checksum.is_some())
            .finish()
    }
}
