//! BLAKE2b hashing with hardware acceleration.
//!
//! `rsblake` provides BLAKE2b (RFC 7693), HMAC-BLAKE2b-512 (RFC 2104) and
//! PBKDF2-HMAC-BLAKE2b-512 (RFC 8018) with automatic CPU feature detection
//! and runtime selection among portable, AVX2, AVX-512 and NEON compression
//! kernels. `no_std` compatible.
//!
//! # Quick Start
//!
//! ```
//! use rsblake::{Blake2b512, Digest};
//!
//! // One-shot hashing
//! let digest = Blake2b512::digest(b"hello world");
//!
//! // Streaming
//! let mut hasher = Blake2b512::new();
//! hasher.update(b"hello ");
//! hasher.update(b"world");
//! assert_eq!(hasher.finalize(), digest);
//! ```
//!
//! Variable-length and keyed hashing, salts and personalization go through
//! [`Blake2b`] and [`Params`]; MACs through [`Hmac`]; key derivation
//! through [`pbkdf2`].
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | Yes | Standard library integration |
//! | `force-portable` | No | Pin the portable compression kernel |
#![cfg_attr(not(feature = "std"), no_std)]

pub use hashes::crypto::blake2b::{self, kernel_name};
pub use hashes::crypto::{Blake2b, Blake2b512, Hmac, Params, hmac, pbkdf2};
pub use hashes::mem::{constant_time_eq, secure_zero};
pub use hashes::{Digest, Error, VerificationError};
pub use platform::{Caps, caps};
