//! Reading private key containers from a stream

use crate::config::{LoadConfig, MAX_LINE_LEN, PRIVKEY_MAGIC};
use crate::parser::LineParser;
use crate::password::PasswordSource;
use crate::record::PrivateKeyRecord;
use crate::sanity;
use crate::secret::SecretKey;
use crate::unpack::unpack;
use crate::{KeyError, Result};
use asign_common::KeyLog;
use std::io::{BufRead, Read};
use zeroize::Zeroizing;

/// Parse a private key container into a record without unwrapping it
///
/// # Errors
///
/// Returns `InvalidFormat` for an empty stream, a wrong magic line, a line
/// longer than [`MAX_LINE_LEN`] or a malformed field line, and `Io` if
/// reading fails.
pub fn parse_private_key<R: BufRead>(mut reader: R) -> Result<PrivateKeyRecord> {
    let mut record = PrivateKeyRecord::new();
    let mut line = Zeroizing::new(Vec::with_capacity(MAX_LINE_LEN));

    if read_line(&mut reader, &mut line)? == 0 {
        return Err(KeyError::format("empty key container"));
    }
    if trim_terminator(&line) != PRIVKEY_MAGIC.as_bytes() {
        KeyLog::log_rejected("private key", "magic line mismatch");
        return Err(KeyError::format("not a private key container"));
    }

    let mut parser = LineParser::new(&mut record);
    loop {
        line.clear();
        if read_line(&mut reader, &mut line)? == 0 {
            break;
        }
        let len = trim_terminator(&line).len();
        line.truncate(len);
        line.push(b'\n');
        parser.feed(&line)?;
    }
    Ok(record)
}

/// Load, check and unwrap a private key
///
/// `source` supplies the password when the key is encrypted.
///
/// # Errors
///
/// Returns the first failure of parsing, the sanity check or unwrapping;
/// nothing partial is ever returned.
pub fn load_private_key<R: BufRead>(
    reader: R,
    source: Option<&mut dyn PasswordSource>,
    config: &LoadConfig,
) -> Result<SecretKey> {
    let record = parse_private_key(reader)?;
    let shape = sanity::check(&record, config.min_rounds)?;
    log::debug!("Private key record is {shape:?}");
    unpack(record, shape, source, config)
}

/// Read one line into `line` without growing it past [`MAX_LINE_LEN`]
fn read_line<R: BufRead>(reader: &mut R, line: &mut Zeroizing<Vec<u8>>) -> Result<usize> {
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', line)?;
    if read == MAX_LINE_LEN && line.last() != Some(&b'\n') {
        return Err(KeyError::format(format!(
            "container line exceeds {MAX_LINE_LEN} bytes"
        )));
    }
    Ok(read)
}

fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
