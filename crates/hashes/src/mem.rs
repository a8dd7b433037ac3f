//! Secure-memory primitives.
//!
//! Everything that touches key material in this crate funnels through these
//! two operations plus the `Zeroizing` scoped-secret pattern: erasure the
//! optimizer cannot elide, and equality whose running time depends only on
//! the input length.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Zero a buffer such that the write cannot be optimized away.
#[inline]
pub fn secure_zero(buf: &mut [u8]) {
  buf.zeroize();
}

/// Constant-time byte equality.
///
/// Returns `true` iff the two buffers are bytewise equal. Equal-length
/// inputs are compared without short-circuiting: every byte pair is XORed
/// into a single accumulator before the zero test. Buffer lengths are not
/// secret; slices of different lengths compare unequal immediately. Two
/// empty slices are equal.
#[inline]
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  a.ct_eq(b).into()
}
