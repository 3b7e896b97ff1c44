//! # asign key containers
//!
//! Loading, validation and password unwrapping of private signing keys
//! stored in the line-oriented `ASIGN-PRIV-KEY:` container, plus decoding
//! of the single-line `EdPK:` public key and `EdSIG:` signature containers.
//!
//! ## Features
//!
//! - **Field parser**: byte-level state machine over `name: value` lines,
//!   driven by a sorted, typed field registry
//! - **Sanity check**: decides whether a record is encrypted or plaintext
//! - **Unwrapping**: PBKDF2-HMAC-SHA256 key derivation, XOR unwrap and a
//!   constant-time BLAKE2b-512 checksum
//! - **Secret hygiene**: every intermediate secret is zeroized, recovered
//!   keys are optionally locked into RAM
//!
//! ## Quick Start
//!
//! ```rust
//! use asign_key::prelude::*;
//!
//! # fn main() -> asign_key::Result<()> {
//! let config = WriteConfig::standard().with_rounds(1);
//! let record = wrap_secret(&[7u8; 64], b"key-id-1", b"hunter2", &config)?;
//! let mut container = Vec::new();
//! write_private_key(&record, &mut container)?;
//!
//! let config = LoadConfig::standard().with_min_rounds(1);
//! let mut password = StaticPassword::new("hunter2");
//! let key = load_private_key(container.as_slice(), Some(&mut password), &config)?;
//! assert_eq!(key.id(), b"key-id-1");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
mod derive;
pub mod error;
pub mod loader;
mod memlock;
pub mod parser;
pub mod password;
pub mod public;
pub mod record;
pub mod registry;
pub mod sanity;
pub mod secret;
pub mod store;
pub mod unpack;
pub mod writer;

// Re-export core types
pub use config::{LoadConfig, WriteConfig};
pub use error::{ErrorKind, KeyError, Result};
pub use record::PrivateKeyRecord;
pub use sanity::KeyShape;
pub use secret::SecretKey;

// Re-export the main API
pub use loader::{load_private_key, parse_private_key};
pub use password::{PasswordSource, StaticPassword};
pub use public::{ContainerFormat, PublicContainer, PUBLIC_KEY_FORMAT, SIGNATURE_FORMAT};
pub use store::{load_private_key_file, load_public_container_file, write_private_key_file};
pub use writer::{plaintext_record, wrap_secret, write_private_key};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        load_private_key, wrap_secret, write_private_key, KeyError, LoadConfig, PasswordSource,
        PublicContainer, Result, SecretKey, StaticPassword, WriteConfig, PUBLIC_KEY_FORMAT,
        SIGNATURE_FORMAT,
    };
}
