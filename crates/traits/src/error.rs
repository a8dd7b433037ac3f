//! Error types for hashing, MAC, and key-derivation operations.
//!
//! Minimal, timing-safe error types. All validation errors are reported
//! before any cryptographic work happens, and a failed call never produces
//! partial output.

use core::fmt;

/// Errors surfaced by hashing sessions and key derivation.
///
/// The variants fall into three groups:
///
/// - **Invalid argument**: out-of-range lengths, malformed parameter
///   blocks, undersized output buffers, zero iteration counts.
/// - **Use after finalize**: [`Error::Finalized`], the session has already
///   produced its digest and its state has been zeroized.
/// - **Internal failure**: [`Error::Backend`], reserved for defensive
///   checks around the compression back-ends; the arithmetic itself cannot
///   fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
  /// Requested digest length is 0 or greater than 64 bytes.
  InvalidDigestLength,
  /// Key is empty or longer than 64 bytes.
  InvalidKeyLength,
  /// A supplied 64-byte parameter block carries an invalid digest length.
  InvalidParameterBlock,
  /// Output buffer is smaller than the digest length recorded at init.
  BufferTooSmall,
  /// Output buffer is empty where at least one byte is required.
  EmptyOutput,
  /// PBKDF2 iteration count is zero.
  InvalidRounds,
  /// Requested derived key exceeds the RFC 8018 length bound.
  DerivedKeyTooLong,
  /// The session was already finalized; its state has been zeroized.
  Finalized,
  /// A compression back-end reported failure.
  Backend,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let msg = match self {
      Self::InvalidDigestLength => "digest length must be 1..=64",
      Self::InvalidKeyLength => "key length must be 1..=64",
      Self::InvalidParameterBlock => "parameter block digest length must be 1..=64",
      Self::BufferTooSmall => "output buffer smaller than recorded digest length",
      Self::EmptyOutput => "output buffer must not be empty",
      Self::InvalidRounds => "iteration count must be at least 1",
      Self::DerivedKeyTooLong => "derived key length exceeds RFC 8018 bound",
      Self::Finalized => "session already finalized",
      Self::Backend => "compression back-end failure",
    };
    f.write_str(msg)
  }
}

impl core::error::Error for Error {}

/// Verification failed.
///
/// Returned when a MAC tag comparison fails. Intentionally opaque: the error
/// carries no details about where the mismatch occurred, and the underlying
/// comparison runs in constant time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct VerificationError;

impl VerificationError {
  /// Create a new verification error.
  ///
  /// This is the only way to construct this error from outside the crate,
  /// ensuring forward compatibility if fields are added in the future.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self
  }
}

impl Default for VerificationError {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for VerificationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("verification failed")
  }
}

impl core::error::Error for VerificationError {}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::string::ToString;

  use super::*;

  #[test]
  fn display_messages() {
    assert_eq!(Error::InvalidDigestLength.to_string(), "digest length must be 1..=64");
    assert_eq!(Error::Finalized.to_string(), "session already finalized");
    assert_eq!(VerificationError::new().to_string(), "verification failed");
  }

  #[test]
  fn error_is_copy_and_eq() {
    let e = Error::BufferTooSmall;
    let e2 = e;
    assert_eq!(e, e2);
    assert_ne!(Error::InvalidKeyLength, Error::InvalidDigestLength);
  }

  #[test]
  fn verification_error_is_opaque_zst() {
    assert_eq!(core::mem::size_of::<VerificationError>(), 0);
    assert_eq!(VerificationError::default(), VerificationError::new());
  }

  #[test]
  fn trait_bounds() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
    assert_send_sync::<VerificationError>();
  }
}
