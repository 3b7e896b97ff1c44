//! Async file helpers around the stream loader and writer
//!
//! Private key bytes are read and written with `std::fs` on the blocking
//! pool, straight into or out of a buffer sized up front, so neither a
//! runtime-side buffer nor a reallocation leaves a copy behind.

use crate::config::{LoadConfig, CONTAINER_CAPACITY, MAX_CONTAINER_LEN};
use crate::loader::load_private_key;
use crate::password::PasswordSource;
use crate::public::{ContainerFormat, PublicContainer};
use crate::record::PrivateKeyRecord;
use crate::secret::SecretKey;
use crate::writer::write_private_key;
use crate::{KeyError, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use zeroize::Zeroizing;

/// Load and unwrap the private key stored at `path`
///
/// The file content is held in a self-zeroing buffer for the whole call.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, `InvalidFormat` if it is larger
/// than [`MAX_CONTAINER_LEN`], otherwise anything [`load_private_key`]
/// returns.
pub async fn load_private_key_file(
    path: impl AsRef<Path>,
    source: Option<&mut dyn PasswordSource>,
    config: &LoadConfig,
) -> Result<SecretKey> {
    let path = path.as_ref();
    let content = read_zeroizing(path.to_path_buf()).await?;
    log::debug!("Read private key container from {}", path.display());
    load_private_key(content.as_slice(), source, config)
}

/// Load a public key or signature stored at `path`
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise anything
/// [`PublicContainer::load`] returns.
pub async fn load_public_container_file(
    path: impl AsRef<Path>,
    format: &ContainerFormat,
) -> Result<PublicContainer> {
    let content = fs::read(path.as_ref()).await.map_err(KeyError::Io)?;
    PublicContainer::load(&content, format)
}

/// Write `record` to `path`, creating parent directories as needed
///
/// On unix the file is created with mode `0600`.
///
/// # Errors
///
/// Returns anything [`write_private_key`] returns, or `Io` if the file
/// cannot be written.
pub async fn write_private_key_file(
    record: &PrivateKeyRecord,
    path: impl AsRef<Path>,
) -> Result<()> {
    let encoded = encode_container(record)?;
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || write_owner_only(&path, &encoded))
        .await
        .map_err(|e| KeyError::Io(std::io::Error::other(e)))?
}

/// Upper bound on the encoded size of `record`
fn container_capacity(record: &PrivateKeyRecord) -> usize {
    CONTAINER_CAPACITY + record.pbkdf_algorithm().map_or(0, str::len)
}

fn encode_container(record: &PrivateKeyRecord) -> Result<Zeroizing<Vec<u8>>> {
    let mut encoded = Zeroizing::new(Vec::new());
    encoded
        .try_reserve_exact(container_capacity(record))
        .map_err(|e| KeyError::Allocation(format!("container buffer: {e}")))?;
    write_private_key(record, &mut *encoded)?;
    Ok(encoded)
}

fn write_owner_only(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()?;
    Ok(())
}

async fn read_zeroizing(path: PathBuf) -> Result<Zeroizing<Vec<u8>>> {
    tokio::task::spawn_blocking(move || read_exact_size(&path))
        .await
        .map_err(|e| KeyError::Io(std::io::Error::other(e)))?
}

fn read_exact_size(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    let mut file = std::fs::File::open(path)?;
    let len = usize::try_from(file.metadata()?.len())
        .ok()
        .filter(|&len| len <= MAX_CONTAINER_LEN)
        .ok_or_else(|| {
            KeyError::format(format!("key container exceeds {MAX_CONTAINER_LEN} bytes"))
        })?;

    let mut content = Zeroizing::new(Vec::new());
    content
        .try_reserve_exact(len)
        .map_err(|e| KeyError::Allocation(format!("container buffer: {e}")))?;
    content.resize(len, 0);
    file.read_exact(content.as_mut_slice())?;
    Ok(content)
}
