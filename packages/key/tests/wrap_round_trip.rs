//! Wrapping, writing and loading back private keys

use asign_key::config::{ID_LEN, SECRET_LEN};
use asign_key::{
    load_private_key, parse_private_key, plaintext_record, wrap_secret, write_private_key,
    ErrorKind, KeyError, LoadConfig, StaticPassword, WriteConfig,
};
use proptest::prelude::*;

fn lenient() -> LoadConfig {
    LoadConfig::standard().with_min_rounds(1).with_memory_lock(false)
}

fn encrypted_container(secret: &[u8], id: &[u8], password: &[u8], rounds: u32) -> Vec<u8> {
    let config = WriteConfig::standard().with_rounds(rounds);
    let record = wrap_secret(secret, id, password, &config).expect("wrap");
    let mut out = Vec::new();
    write_private_key(&record, &mut out).expect("write");
    out
}

#[test]
fn test_encrypted_key_round_trip() {
    let secret = [0x33u8; SECRET_LEN];
    let container = encrypted_container(&secret, b"roundtrp", b"correct horse", 16);

    let mut password = StaticPassword::new("correct horse");
    let key = load_private_key(container.as_slice(), Some(&mut password), &lenient())
        .expect("unwrap");
    assert_eq!(key.data(), &secret[..]);
    assert_eq!(key.id(), b"roundtrp");
}

#[test]
fn test_wrong_password_fails_authentication() {
    let container = encrypted_container(&[1u8; SECRET_LEN], b"roundtrp", b"right", 4);
    let mut password = StaticPassword::new("wrong");
    let err = load_private_key(container.as_slice(), Some(&mut password), &lenient())
        .expect_err("wrong password");
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_encrypted_key_without_source_needs_password() {
    let container = encrypted_container(&[1u8; SECRET_LEN], b"roundtrp", b"right", 4);
    let err = load_private_key(container.as_slice(), None, &lenient()).expect_err("no source");
    assert!(matches!(err, KeyError::PasswordRequired));
}

#[test]
fn test_declined_password_fails_authentication() {
    let container = encrypted_container(&[1u8; SECRET_LEN], b"roundtrp", b"right", 4);
    let mut declined = |_buf: &mut [u8], _max_len: usize| -> Option<usize> { None };
    let err = load_private_key(container.as_slice(), Some(&mut declined), &lenient())
        .expect_err("declined");
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_closure_password_source() {
    let container = encrypted_container(&[8u8; SECRET_LEN], b"closure!", b"from-tty", 4);
    let mut prompts = 0;
    let mut source = |buf: &mut [u8], max_len: usize| -> Option<usize> {
        prompts += 1;
        let password = b"from-tty";
        if password.len() > max_len {
            return None;
        }
        buf[..password.len()].copy_from_slice(password);
        Some(password.len())
    };
    let key = load_private_key(container.as_slice(), Some(&mut source), &lenient())
        .expect("unwrap");
    assert_eq!(key.data(), &[8u8; SECRET_LEN][..]);
    assert_eq!(prompts, 1);
}

#[test]
fn test_tampered_checksum_fails_authentication() {
    let container = encrypted_container(&[2u8; SECRET_LEN], b"tampered", b"pw", 4);
    let text = String::from_utf8(container).expect("utf8");
    let tampered: String = text
        .lines()
        .map(|line| match line.strip_prefix("checksum: ") {
            Some(hex_digest) => {
                let flipped = if hex_digest.starts_with('0') { "1" } else { "0" };
                format!("checksum: {flipped}{}\n", &hex_digest[1..])
            }
            None => format!("{line}\n"),
        })
        .collect();
    let mut password = StaticPassword::new("pw");
    let err = load_private_key(tampered.as_bytes(), Some(&mut password), &lenient())
        .expect_err("tampered");
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_plaintext_round_trip_preserves_record() {
    let record = plaintext_record(&[4u8; SECRET_LEN], &[5u8; ID_LEN]).expect("record");
    let mut out = Vec::new();
    write_private_key(&record, &mut out).expect("write");
    let parsed = parse_private_key(out.as_slice()).expect("parse");
    assert_eq!(parsed, record);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_wrapped_keys_load_back(
        secret in prop::collection::vec(any::<u8>(), SECRET_LEN),
        id in prop::collection::vec(any::<u8>(), ID_LEN),
        password in "[ -~]{1,64}",
        rounds in 1u32..8,
    ) {
        let container = encrypted_container(&secret, &id, password.as_bytes(), rounds);
        let mut source = StaticPassword::new(&password);
        let key = load_private_key(container.as_slice(), Some(&mut source), &lenient())
            .expect("unwrap");
        prop_assert_eq!(key.data(), secret.as_slice());
        prop_assert_eq!(&key.id()[..], id.as_slice());
    }

    #[test]
    fn prop_parser_never_panics(body in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut text = b"ASIGN-PRIV-KEY:\n".to_vec();
        text.extend_from_slice(&body);
        let _ = load_private_key(text.as_slice(), None, &lenient());
    }
}
