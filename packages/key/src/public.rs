//! Single-line public key and signature containers
//!
//! Native format is `<MAGIC><version>:<base64 id>:<base64 data>`, where the
//! magic carries its own trailing delimiter.

use crate::config::{ID_LEN, PUBKEY_MAGIC, PUBLIC_KEY_LEN, SIGNATURE_LEN, SIGNATURE_MAGIC};
use crate::{KeyError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Expected shape of a public container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerFormat {
    /// Prefix including its trailing delimiter
    pub magic: &'static str,
    /// Lowest accepted version
    pub min_version: u32,
    /// Highest accepted version
    pub max_version: u32,
    /// Decoded identifier length
    pub id_len: usize,
    /// Decoded data length
    pub data_len: usize,
}

/// Public signing key container
pub const PUBLIC_KEY_FORMAT: ContainerFormat = ContainerFormat {
    magic: PUBKEY_MAGIC,
    min_version: 1,
    max_version: 1,
    id_len: ID_LEN,
    data_len: PUBLIC_KEY_LEN,
};

/// Detached signature container
pub const SIGNATURE_FORMAT: ContainerFormat = ContainerFormat {
    magic: SIGNATURE_MAGIC,
    min_version: 1,
    max_version: 1,
    id_len: ID_LEN,
    data_len: SIGNATURE_LEN,
};

/// A decoded public key or signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicContainer {
    version: u32,
    id: Vec<u8>,
    data: Vec<u8>,
}

impl PublicContainer {
    /// Build a container from its parts
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if a length or the version does not fit `format`.
    pub fn new(version: u32, id: &[u8], data: &[u8], format: &ContainerFormat) -> Result<Self> {
        if !(format.min_version..=format.max_version).contains(&version) {
            return Err(KeyError::format(format!("unsupported version {version}")));
        }
        if id.len() != format.id_len || data.len() != format.data_len {
            return Err(KeyError::format("container field has the wrong length"));
        }
        Ok(Self {
            version,
            id: id.to_vec(),
            data: data.to_vec(),
        })
    }

    /// Decode `buf` according to `format`
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` on a magic mismatch, a version outside the
    /// accepted range, bad base64, or a decoded length mismatch.
    pub fn load(buf: &[u8], format: &ContainerFormat) -> Result<Self> {
        let magic = format.magic.as_bytes();
        if buf.len() <= magic.len() || !buf.starts_with(magic) {
            return Err(KeyError::format("container magic mismatch"));
        }
        let rest = &buf[magic.len()..];

        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 || rest.get(digits) != Some(&b':') {
            return Err(KeyError::format("container version must be followed by `:`"));
        }
        let version = std::str::from_utf8(&rest[..digits])
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| KeyError::format("container version is out of range"))?;
        if version < format.min_version || version > format.max_version {
            return Err(KeyError::format(format!("unsupported version {version}")));
        }
        let rest = &rest[digits + 1..];

        let sep = rest
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| KeyError::format("container is missing its data field"))?;
        let id = decode_exact(&rest[..sep], format.id_len, "id")?;
        let data = decode_exact(rest[sep + 1..].trim_ascii_end(), format.data_len, "data")?;

        Ok(Self { version, id, data })
    }

    /// Encode as a single line, without terminator
    #[must_use]
    pub fn encode(&self, magic: &str) -> String {
        format!(
            "{magic}{}:{}:{}",
            self.version,
            STANDARD.encode(&self.id),
            STANDARD.encode(&self.data)
        )
    }

    /// Container version
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Key identifier
    #[must_use]
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Public key or signature bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

fn decode_exact(encoded: &[u8], len: usize, what: &str) -> Result<Vec<u8>> {
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| KeyError::format(format!("container {what} is not valid base64")))?;
    if decoded.len() != len {
        return Err(KeyError::format(format!(
            "container {what} must decode to {len} bytes, got {}",
            decoded.len()
        )));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(version: &str, id: &[u8], data: &[u8]) -> String {
        format!(
            "{PUBKEY_MAGIC}{version}:{}:{}",
            STANDARD.encode(id),
            STANDARD.encode(data)
        )
    }

    #[test]
    fn test_public_key_loads() {
        let text = line("1", &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN]);
        let pk = PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).expect("load");
        assert_eq!(pk.version(), 1);
        assert_eq!(pk.id(), &[1u8; ID_LEN][..]);
        assert_eq!(pk.data(), &[2u8; PUBLIC_KEY_LEN][..]);
    }

    #[test]
    fn test_trailing_newline_is_tolerated() {
        let text = line("1", &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN]) + "\n";
        assert!(PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).is_ok());
    }

    #[test]
    fn test_version_out_of_range_is_rejected() {
        let text = line("2", &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN]);
        assert!(PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
        let text = line("0", &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN]);
        assert!(PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
        let text = line("99999999999", &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN]);
        assert!(PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
    }

    #[test]
    fn test_version_syntax_is_strict() {
        for bad in ["", "x", "1x", "+1", " 1"] {
            let text = line(bad, &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN]);
            assert!(
                PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).is_err(),
                "version {bad:?}"
            );
        }
    }

    #[test]
    fn test_wrong_lengths_are_rejected() {
        let short_id = line("1", &[1u8; ID_LEN - 1], &[2u8; PUBLIC_KEY_LEN]);
        assert!(PublicContainer::load(short_id.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
        let long_data = line("1", &[1u8; ID_LEN], &[2u8; PUBLIC_KEY_LEN + 1]);
        assert!(PublicContainer::load(long_data.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
    }

    #[test]
    fn test_magic_and_structure_are_checked() {
        assert!(PublicContainer::load(b"EdPK:", &PUBLIC_KEY_FORMAT).is_err());
        assert!(PublicContainer::load(b"XXPK:1:AAAA:AAAA", &PUBLIC_KEY_FORMAT).is_err());
        let no_data = format!("{PUBKEY_MAGIC}1:{}", STANDARD.encode([1u8; ID_LEN]));
        assert!(PublicContainer::load(no_data.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
        let bad_b64 = format!("{PUBKEY_MAGIC}1:!!!!:{}", STANDARD.encode([2u8; 32]));
        assert!(PublicContainer::load(bad_b64.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
    }

    #[test]
    fn test_signature_format() {
        let sig = PublicContainer::new(1, &[3u8; ID_LEN], &[4u8; SIGNATURE_LEN], &SIGNATURE_FORMAT)
            .expect("signature");
        let text = sig.encode(SIGNATURE_FORMAT.magic);
        assert!(text.starts_with("EdSIG:1:"));
        let back = PublicContainer::load(text.as_bytes(), &SIGNATURE_FORMAT).expect("load");
        assert_eq!(back, sig);
        assert!(PublicContainer::load(text.as_bytes(), &PUBLIC_KEY_FORMAT).is_err());
    }
}
