//! Recovered secret key material

use crate::config::{ID_LEN, SECRET_LEN};
use crate::memlock;
use crate::{KeyError, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A recovered signing secret and its key identifier
///
/// The secret bytes are locked into RAM where the platform allows it and
/// are overwritten with zeros before the memory is unlocked and freed.
pub struct SecretKey {
    data: Box<[u8]>,
    id: [u8; ID_LEN],
    locked: bool,
}

impl SecretKey {
    /// Copy `data` and `id` into a new secret
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if either length is wrong and `Allocation` if
    /// the secret buffer cannot be reserved.
    pub(crate) fn from_parts(data: &[u8], id: &[u8], lock_memory: bool) -> Result<Self> {
        if data.len() != SECRET_LEN {
            return Err(KeyError::format(format!(
                "secret must be {SECRET_LEN} bytes, got {}",
                data.len()
            )));
        }
        let id: [u8; ID_LEN] = id
            .try_into()
            .map_err(|_| KeyError::format(format!("key id must be {ID_LEN} bytes")))?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(SECRET_LEN)
            .map_err(|e| KeyError::Allocation(format!("secret buffer: {e}")))?;
        buf.extend_from_slice(data);
        let data = buf.into_boxed_slice();

        let locked = lock_memory && memlock::lock(&data);
        Ok(Self { data, id, locked })
    }

    /// The secret key bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The key identifier
    #[must_use]
    pub fn id(&self) -> &[u8; ID_LEN] {
        &self.id
    }

    /// Whether the secret pages are locked in RAM
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        Zeroize::zeroize(&mut self.data[..]);
        if self.locked {
            memlock::unlock(&self.data);
        }
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.id == other.id && bool::from(self.data[..].ct_eq(&other.data[..]))
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("id", &hex::encode(self.id))
            .field("data", &"***")
            .field("locked", &self.locked)
            .finish()
    }
}
