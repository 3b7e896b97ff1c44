//! Password retrieval for encrypted keys
//!
//! A [`PasswordSource`] writes the password into a buffer it is handed. The
//! buffer ends with a random canary the source must not touch; after the
//! call the canary and the reported length are both checked before the
//! password is used.

use crate::config::{LoadConfig, CANARY_LEN};
use crate::{KeyError, Result};
use rand::RngCore;
use zeroize::Zeroizing;

/// Supplies the password for an encrypted key
pub trait PasswordSource {
    /// Write the password into `buf` and return its length
    ///
    /// At most `max_len` bytes may be written. `buf` is larger than
    /// `max_len`; anything past `max_len` belongs to the caller. Return
    /// `None` to decline.
    fn read_password(&mut self, buf: &mut [u8], max_len: usize) -> Option<usize>;
}

impl<F> PasswordSource for F
where
    F: FnMut(&mut [u8], usize) -> Option<usize>,
{
    fn read_password(&mut self, buf: &mut [u8], max_len: usize) -> Option<usize> {
        self(buf, max_len)
    }
}

/// A password already held in memory
pub struct StaticPassword(Zeroizing<Vec<u8>>);

impl StaticPassword {
    /// Wrap `password`; the copy is wiped on drop
    pub fn new(password: impl AsRef<[u8]>) -> Self {
        Self(Zeroizing::new(password.as_ref().to_vec()))
    }
}

impl std::fmt::Debug for StaticPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticPassword(***)")
    }
}

impl PasswordSource for StaticPassword {
    fn read_password(&mut self, buf: &mut [u8], max_len: usize) -> Option<usize> {
        let len = self.0.len();
        if len == 0 || len > max_len {
            return None;
        }
        buf[..len].copy_from_slice(&self.0);
        Some(len)
    }
}

/// Password bytes checked against buffer overrun; wiped on drop
pub(crate) struct Password {
    buf: Zeroizing<Vec<u8>>,
    len: usize,
}

impl Password {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Ask `source` for a password inside a canary-guarded buffer
pub(crate) fn read_password(
    source: &mut dyn PasswordSource,
    config: &LoadConfig,
) -> Result<Password> {
    let capacity = config.password_capacity();
    if capacity == 0 {
        return Err(KeyError::authentication("password buffer is too small"));
    }

    let mut buf = Zeroizing::new(vec![0u8; capacity + CANARY_LEN]);
    let mut canary = [0u8; CANARY_LEN];
    rand::rng().fill_bytes(&mut canary);
    buf[capacity..].copy_from_slice(&canary);

    let reported = source.read_password(buf.as_mut_slice(), capacity);

    if buf[capacity..] != canary {
        log::warn!("Password source wrote past its buffer; password discarded");
        return Err(KeyError::authentication("password buffer overflow"));
    }
    match reported {
        Some(len) if len > capacity => {
            log::warn!("Password source reported {len} bytes for a {capacity} byte buffer");
            Err(KeyError::authentication("password buffer overflow"))
        }
        Some(len) if len > 0 => Ok(Password { buf, len }),
        _ => Err(KeyError::authentication("password was not provided")),
    }
}
