//! BLAKE2b (RFC 7693), HMAC-BLAKE2b-512 (RFC 2104) and
//! PBKDF2-HMAC-BLAKE2b-512 (RFC 8018) with runtime kernel dispatch.
//!
//! This crate is `no_std` compatible. Its only runtime dependencies are the
//! workspace `traits`/`platform` crates plus `zeroize` and `subtle` for the
//! secure-memory discipline; dev-only dependencies are used for oracle
//! testing and benchmarking.
//!
//! # Modules
//!
//! - [`crypto`] - BLAKE2b hashing, HMAC, and PBKDF2.
//! - [`mem`] - guaranteed zeroization and constant-time comparison.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod crypto;
pub mod mem;

mod util;

pub use traits::{Digest, Error, VerificationError};
