//! Structured logging for key handling
//!
//! Provides `env_logger` initialisation and log helpers that never print
//! secret material. Key identifiers are reduced to a short SHA-256
//! fingerprint before they reach the log.

use log::{debug, info, log, warn, Level};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging entry points shared by the asign crates
pub struct KeyLog;

impl KeyLog {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels are configured through `RUST_LOG`:
    /// - `RUST_LOG=debug` - every key load step
    /// - `RUST_LOG=info` - successful loads and warnings
    /// - `RUST_LOG=asign_key=debug` - module-specific levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for tests
    ///
    /// Safe to call from every test; repeated initialisation is ignored.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log the outcome of a key operation, identifying the key by fingerprint
    pub fn log_key_operation(operation: &str, key_id: &[u8], success: bool) {
        let fingerprint = Self::fingerprint(key_id);
        if success {
            info!("Key operation succeeded: {operation} (key: {fingerprint})");
        } else {
            warn!("Key operation failed: {operation} (key: {fingerprint})");
        }
    }

    /// Log a rejected container without echoing its content
    pub fn log_rejected(operation: &str, reason: &str) {
        debug!("Rejected {operation}: {reason}");
    }

    /// Log a failed key operation at `level`
    ///
    /// Only the failure classification is logged, never the error payload.
    pub fn log_key_failure<K: std::fmt::Debug>(
        operation: &str,
        key_id: &[u8],
        level: Level,
        kind: K,
    ) {
        log!(
            level,
            "Key operation failed: {operation} (key: {}, kind: {kind:?})",
            Self::fingerprint(key_id)
        );
    }

    /// Short fingerprint of a key identifier
    ///
    /// First 12 hex characters of the SHA-256 digest, prefixed with `#`.
    #[must_use]
    pub fn fingerprint(key_id: &[u8]) -> String {
        let hash = Sha256::digest(key_id);
        let hex_hash = hex::encode(hash);
        format!("#{}", &hex_hash[..12])
    }
}
