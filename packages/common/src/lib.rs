//! Shared infrastructure for the asign crates
//!
//! This crate provides:
//! - `env_logger` bootstrap for binaries and tests
//! - Log helpers that fingerprint key identifiers instead of printing them

pub mod logging;

pub use logging::KeyLog;
