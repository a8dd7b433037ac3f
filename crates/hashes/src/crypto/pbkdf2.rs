//! PBKDF2-HMAC-BLAKE2b-512 (RFC 8018).
//!
//! ```text
//! DK   = T1 || T2 || ... || T_ceil(dkLen/hLen)
//! Ti   = U1 ^ U2 ^ ... ^ Uc
//! U1   = PRF(password, salt || BE32(i))
//! Uj   = PRF(password, U_{j-1})
//! ```
//!
//! with PRF = HMAC-BLAKE2b-512, hLen = 64. The `U` and `T` intermediates
//! are zeroized on every loop exit, normal or error.

#![allow(clippy::indexing_slicing)] // Fixed-size PRF block offsets

use zeroize::Zeroizing;

use super::hmac::Hmac;
use traits::Error;

/// PRF output size in bytes (HMAC-BLAKE2b-512).
pub const PRF_OUTPUT_BYTES: usize = 64;

/// RFC 8018 derived-key length bound: (2^32 - 1) blocks of hLen bytes.
const MAX_DK_BYTES: u128 = (u32::MAX as u128) * PRF_OUTPUT_BYTES as u128;

/// Derive `out.len()` key bytes from a password and salt.
///
/// Validates that `out` is non-empty, `rounds >= 1`, and `out.len()` is
/// within the RFC 8018 bound before any cryptographic work; on failure no
/// output is written.
pub fn derive_into(out: &mut [u8], password: &[u8], salt: &[u8], rounds: u32) -> Result<(), Error> {
  if out.is_empty() {
    return Err(Error::EmptyOutput);
  }
  if rounds == 0 {
    return Err(Error::InvalidRounds);
  }
  if out.len() as u128 > MAX_DK_BYTES {
    return Err(Error::DerivedKeyTooLong);
  }

  let mut block_idx: u32 = 1;
  for chunk in out.chunks_mut(PRF_OUTPUT_BYTES) {
    let mut u = Zeroizing::new([0u8; PRF_OUTPUT_BYTES]);
    let mut t = Zeroizing::new([0u8; PRF_OUTPUT_BYTES]);

    // U1 = PRF(password, salt || BE32(i))
    let mut prf = Hmac::new(password)?;
    prf.update(salt)?;
    prf.update(&block_idx.to_be_bytes())?;
    prf.finalize_into(&mut u[..])?;
    t.copy_from_slice(&u[..]);

    // U2 .. Uc, folded into T
    for _ in 1..rounds {
      let mut prf = Hmac::new(password)?;
      prf.update(&u[..])?;
      prf.finalize_into(&mut u[..])?;
      for (tb, ub) in t.iter_mut().zip(u.iter()) {
        *tb ^= *ub;
      }
    }

    let take = chunk.len();
    chunk.copy_from_slice(&t[..take]);
    block_idx = block_idx.wrapping_add(1);
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_invalid_arguments() {
    let mut out = [0u8; 32];
    assert_eq!(derive_into(&mut [], b"pw", b"salt", 1).unwrap_err(), Error::EmptyOutput);
    assert_eq!(derive_into(&mut out, b"pw", b"salt", 0).unwrap_err(), Error::InvalidRounds);
    // Empty passwords are rejected by the PRF's key validation.
    assert_eq!(derive_into(&mut out, b"", b"salt", 1).unwrap_err(), Error::InvalidKeyLength);
  }

  #[test]
  fn no_output_is_written_on_validation_failure() {
    let mut out = [0xAAu8; 32];
    let _ = derive_into(&mut out, b"pw", b"salt", 0);
    assert_eq!(out, [0xAAu8; 32]);
  }

  #[test]
  fn short_outputs_are_prefixes_of_longer_ones() {
    let mut long = [0u8; 100];
    derive_into(&mut long, b"pw", b"salt", 3).unwrap();

    for len in [1usize, 31, 64, 65, 99] {
      let mut short = [0u8; 100];
      derive_into(&mut short[..len], b"pw", b"salt", 3).unwrap();
      assert_eq!(&short[..len], &long[..len], "prefix mismatch at len={len}");
    }
  }

  #[test]
  fn sensitive_to_every_input() {
    let mut base = [0u8; 64];
    derive_into(&mut base, b"pw", b"salt", 2).unwrap();

    let mut other = [0u8; 64];
    derive_into(&mut other, b"pw2", b"salt", 2).unwrap();
    assert_ne!(base, other);

    derive_into(&mut other, b"pw", b"salt2", 2).unwrap();
    assert_ne!(base, other);

    derive_into(&mut other, b"pw", b"salt", 3).unwrap();
    assert_ne!(base, other);

    derive_into(&mut other, b"pw", b"salt", 2).unwrap();
    assert_eq!(base, other);
  }
}
