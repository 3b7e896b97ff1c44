//! Container constants and loader configuration
//!
//! Format constants are fixed by the container layout. The tunables live in
//! [`LoadConfig`] and [`WriteConfig`], which follow the preset style of a
//! KDF configuration: pick `standard()` unless there is a reason not to.

/// Exact first line of a private key container
pub const PRIVKEY_MAGIC: &str = "ASIGN-PRIV-KEY:";

/// Prefix of a public key container
pub const PUBKEY_MAGIC: &str = "EdPK:";

/// Prefix of a signature container
pub const SIGNATURE_MAGIC: &str = "EdSIG:";

/// Length of the secret signing key in bytes
pub const SECRET_LEN: usize = 64;

/// Length of a public signing key in bytes
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of a signature in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Length of the BLAKE2b-512 checksum in bytes
pub const DIGEST_LEN: usize = 64;

/// Length of a key identifier in bytes
pub const ID_LEN: usize = 8;

/// Length of the KDF salt in bytes
pub const SALT_LEN: usize = 16;

/// Name of the only supported password KDF
pub const PBKDF_ALG: &str = "pbkdf2-sha256";

/// Minimum number of KDF rounds accepted for an encrypted key
pub const MIN_ROUNDS: u32 = 10_000;

/// Rounds used when wrapping a new key
pub const DEFAULT_ROUNDS: u32 = 100_000;

/// Size of the password buffer, canary included
pub const PASSWORD_BUFFER_LEN: usize = 1024;

/// Size of the random canary at the end of the password buffer
pub const CANARY_LEN: usize = 10;

/// Longest accepted container line, terminator included
pub const MAX_LINE_LEN: usize = 1024;

/// Largest private key file the file loader will read
pub const MAX_CONTAINER_LEN: usize = 64 * 1024;

/// Encoded size of every fixed-width private key line together
pub const CONTAINER_CAPACITY: usize = 1024;

/// Settings for loading private keys
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Fewest KDF rounds an encrypted key may declare
    pub min_rounds: u32,
    /// Password buffer size including the canary; must exceed [`CANARY_LEN`]
    pub password_buffer_len: usize,
    /// Ask the OS to keep recovered secrets out of swap
    pub lock_memory: bool,
}

impl LoadConfig {
    /// Standard configuration
    #[must_use]
    pub fn standard() -> Self {
        Self {
            min_rounds: MIN_ROUNDS,
            password_buffer_len: PASSWORD_BUFFER_LEN,
            lock_memory: true,
        }
    }

    /// Refuse keys wrapped with fewer than 100 000 rounds
    #[must_use]
    pub fn hardened() -> Self {
        Self {
            min_rounds: DEFAULT_ROUNDS,
            ..Self::standard()
        }
    }

    /// Override the minimum accepted rounds
    #[must_use]
    pub fn with_min_rounds(mut self, min_rounds: u32) -> Self {
        self.min_rounds = min_rounds;
        self
    }

    /// Enable or disable memory locking of recovered secrets
    #[must_use]
    pub fn with_memory_lock(mut self, lock_memory: bool) -> Self {
        self.lock_memory = lock_memory;
        self
    }

    /// Usable password bytes, i.e. the buffer minus the canary
    #[must_use]
    pub fn password_capacity(&self) -> usize {
        self.password_buffer_len.saturating_sub(CANARY_LEN)
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Settings for wrapping new private keys
#[derive(Debug, Clone)]
pub struct WriteConfig {
    /// KDF rounds written into new encrypted keys
    pub rounds: u32,
}

impl WriteConfig {
    /// Standard configuration
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
        }
    }

    /// Override the KDF rounds
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self::standard()
    }
}
