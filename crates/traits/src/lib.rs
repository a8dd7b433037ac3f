//! Core traits for the rsblake workspace.
//!
//! This crate provides the foundational traits and error types that the
//! rsblake implementations conform to. It is `no_std` compatible and has
//! zero dependencies.
//!
//! # Contents
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Digest`] | Streaming hash functions with a fixed output size |
//! | [`Error`] | Validation and lifecycle errors for hashing sessions |
//! | [`VerificationError`] | Opaque error for constant-time tag verification |
//!
//! # Fallibility Discipline
//!
//! This crate denies `unwrap`, `expect`, and indexing in non-test code to
//! ensure all error paths are handled explicitly.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod digest;
pub mod error;

pub use digest::Digest;
pub use error::{Error, VerificationError};
