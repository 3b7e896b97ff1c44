//! Recognised private key fields
//!
//! A static table sorted by field name. Each entry knows how to convert its
//! raw text value and which record slot it fills, so dispatch is a typed
//! setter rather than an offset into the record.

use crate::config::{DIGEST_LEN, ID_LEN, SALT_LEN, SECRET_LEN};
use crate::record::PrivateKeyRecord;
use crate::{KeyError, Result};
use zeroize::Zeroizing;

/// How a field value is written in the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, copied verbatim
    Text,
    /// Non-negative base-10 integer
    Unsigned,
    /// Hex-encoded bytes that must decode to exactly `len` bytes
    Hex {
        /// Required decoded length
        len: usize,
    },
}

/// A converted field value
pub(crate) enum FieldValue {
    Text(String),
    Unsigned(u32),
    Hex(Zeroizing<Vec<u8>>),
}

type Assign = fn(&mut PrivateKeyRecord, FieldValue) -> Result<()>;

/// One recognised field
pub struct FieldSpec {
    /// Field name as written before the colon
    pub name: &'static str,
    /// Value encoding
    pub kind: FieldKind,
    assign: Assign,
}

/// Recognised fields; must stay sorted by name for `lookup`
pub static FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        name: "checksum",
        kind: FieldKind::Hex { len: DIGEST_LEN },
        assign: |record, value| set_once(&mut record.checksum, value.into_hex()?, "checksum"),
    },
    FieldSpec {
        name: "data",
        kind: FieldKind::Hex { len: SECRET_LEN },
        assign: |record, value| set_once(&mut record.encrypted_blob, value.into_hex()?, "data"),
    },
    FieldSpec {
        name: "id",
        kind: FieldKind::Hex { len: ID_LEN },
        assign: |record, value| set_once(&mut record.id, value.into_hex()?, "id"),
    },
    FieldSpec {
        name: "kdf",
        kind: FieldKind::Text,
        assign: |record, value| set_once(&mut record.pbkdf_algorithm, value.into_text()?, "kdf"),
    },
    FieldSpec {
        name: "rounds",
        kind: FieldKind::Unsigned,
        assign: |record, value| set_once(&mut record.rounds, value.into_unsigned()?, "rounds"),
    },
    FieldSpec {
        name: "salt",
        kind: FieldKind::Hex { len: SALT_LEN },
        assign: |record, value| set_once(&mut record.salt, value.into_hex()?, "salt"),
    },
    FieldSpec {
        name: "version",
        kind: FieldKind::Unsigned,
        assign: |record, value| set_once(&mut record.version, value.into_unsigned()?, "version"),
    },
];

/// Find a field by its exact, case-sensitive name
#[must_use]
pub fn lookup(name: &[u8]) -> Option<&'static FieldSpec> {
    FIELDS
        .binary_search_by(|field| field.name.as_bytes().cmp(name))
        .ok()
        .map(|idx| &FIELDS[idx])
}

impl FieldSpec {
    /// Convert `raw` according to this field's kind and store it in `record`
    pub(crate) fn apply(&self, raw: &[u8], record: &mut PrivateKeyRecord) -> Result<()> {
        let value = self.convert(raw)?;
        (self.assign)(record, value)
    }

    fn convert(&self, raw: &[u8]) -> Result<FieldValue> {
        match self.kind {
            FieldKind::Text => Ok(FieldValue::Text(String::from_utf8_lossy(raw).into_owned())),
            FieldKind::Unsigned => {
                if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
                    return Err(KeyError::format(format!(
                        "field `{}` must be a decimal number",
                        self.name
                    )));
                }
                // digits only, so from_utf8 cannot fail; parse fails on overflow
                std::str::from_utf8(raw)
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
                    .map(FieldValue::Unsigned)
                    .ok_or_else(|| {
                        KeyError::format(format!("field `{}` is out of range", self.name))
                    })
            }
            FieldKind::Hex { len } => {
                if raw.len() != len * 2 {
                    return Err(KeyError::format(format!(
                        "field `{}` must hold {len} hex-encoded bytes",
                        self.name
                    )));
                }
                let mut out = Zeroizing::new(vec![0u8; len]);
                hex::decode_to_slice(raw, out.as_mut_slice()).map_err(|_| {
                    KeyError::format(format!("field `{}` is not valid hex", self.name))
                })?;
                Ok(FieldValue::Hex(out))
            }
        }
    }
}

impl FieldValue {
    fn into_hex(self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Hex(bytes) => Ok(bytes),
            _ => Err(KeyError::format("expected a hex value")),
        }
    }

    fn into_text(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            _ => Err(KeyError::format("expected a text value")),
        }
    }

    fn into_unsigned(self) -> Result<u32> {
        match self {
            Self::Unsigned(n) => Ok(n),
            _ => Err(KeyError::format("expected a decimal value")),
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str) -> Result<()> {
    if slot.is_some() {
        return Err(KeyError::format(format!("field `{name}` already set")));
    }
    *slot = Some(value);
    Ok(())
}
