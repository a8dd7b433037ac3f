//! HMAC-BLAKE2b-512 (RFC 2104).
//!
//! Block size B = 128 bytes, output size L = 64 bytes. Keys longer than one
//! block are replaced by their BLAKE2b-512 digest before padding. The
//! session composes two independent BLAKE2b-512 streams: the inner one
//! absorbs `ipad || message`, the outer one `opad || inner_digest`.
//!
//! Key material only ever lives in `Zeroizing` buffers or in the session
//! itself, which zeroizes on drop; every failure path erases the partial
//! state before the error surfaces.

#![allow(clippy::indexing_slicing)] // Fixed-size pad and digest offsets

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::blake2b::{self, Blake2b};
use crate::mem::constant_time_eq;
use traits::{Error, VerificationError};

/// MAC output size in bytes.
pub const DIGEST_BYTES: usize = 64;
/// HMAC block size in bytes (the BLAKE2b block size).
pub const BLOCK_BYTES: usize = 128;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// An HMAC-BLAKE2b-512 session.
///
/// Exclusively owned by the caller. After
/// [`finalize_into`](Self::finalize_into) the session fails further
/// operations with [`Error::Finalized`]; [`reset`](Self::reset) restores
/// the post-init state from the retained normalized key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Hmac {
  inner: Blake2b,
  outer: Blake2b,
  /// Normalized key (hashed if longer than one block), zero-padded.
  key_block: [u8; BLOCK_BYTES],
  finalized: bool,
}

impl Hmac {
  /// Create a session from a non-empty key of any length.
  pub fn new(key: &[u8]) -> Result<Self, Error> {
    if key.is_empty() {
      return Err(Error::InvalidKeyLength);
    }

    let mut key_block = Zeroizing::new([0u8; BLOCK_BYTES]);
    if key.len() > BLOCK_BYTES {
      blake2b::hash_into(&mut key_block[..DIGEST_BYTES], key)?;
    } else {
      key_block[..key.len()].copy_from_slice(key);
    }

    let (inner, outer) = streams_from_key(&key_block)?;
    Ok(Self {
      inner,
      outer,
      key_block: *key_block,
      finalized: false,
    })
  }

  /// Forward message bytes to the inner hash.
  pub fn update(&mut self, data: &[u8]) -> Result<(), Error> {
    if self.finalized {
      return Err(Error::Finalized);
    }
    self.inner.update(data)
  }

  /// Finalize into `out`, which must hold at least 64 bytes; exactly 64
  /// bytes are written.
  ///
  /// The inner digest is zeroized before returning, and both streams are
  /// consumed (their states zeroized by their own finalization).
  pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<(), Error> {
    if self.finalized {
      return Err(Error::Finalized);
    }
    if out.len() < DIGEST_BYTES {
      return Err(Error::BufferTooSmall);
    }

    let inner_digest = Zeroizing::new(self.inner.finalize_raw());
    self.outer.update(&inner_digest[..])?;
    let digest = Zeroizing::new(self.outer.finalize_raw());
    out[..DIGEST_BYTES].copy_from_slice(&digest[..]);
    self.finalized = true;
    Ok(())
  }

  /// Finalize and return the 64-byte tag.
  pub fn finalize(&mut self) -> Result<[u8; DIGEST_BYTES], Error> {
    let mut out = [0u8; DIGEST_BYTES];
    self.finalize_into(&mut out)?;
    Ok(out)
  }

  /// Finalize and compare against an expected 64-byte tag in constant
  /// time.
  pub fn verify(mut self, tag: &[u8]) -> Result<(), VerificationError> {
    let Ok(digest) = self.finalize() else {
      return Err(VerificationError::new());
    };
    let digest = Zeroizing::new(digest);
    if constant_time_eq(&digest[..], tag) {
      Ok(())
    } else {
      Err(VerificationError::new())
    }
  }

  /// Restore the post-init state from the retained normalized key.
  pub fn reset(&mut self) -> Result<(), Error> {
    let (inner, outer) = streams_from_key(&self.key_block)?;
    self.inner = inner;
    self.outer = outer;
    self.finalized = false;
    Ok(())
  }
}

impl core::fmt::Debug for Hmac {
  /// Redacted: never prints key material or hash state.
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Hmac")
      .field("finalized", &self.finalized)
      .finish_non_exhaustive()
  }
}

/// Derive ipad/opad from a normalized key block and absorb them into fresh
/// inner and outer streams.
fn streams_from_key(key_block: &[u8; BLOCK_BYTES]) -> Result<(Blake2b, Blake2b), Error> {
  let mut ipad = Zeroizing::new([0u8; BLOCK_BYTES]);
  let mut opad = Zeroizing::new([0u8; BLOCK_BYTES]);
  for ((i, o), k) in ipad.iter_mut().zip(opad.iter_mut()).zip(key_block.iter()) {
    *i = k ^ IPAD;
    *o = k ^ OPAD;
  }

  let mut inner = Blake2b::new(DIGEST_BYTES)?;
  inner.update(&ipad[..])?;
  let mut outer = Blake2b::new(DIGEST_BYTES)?;
  outer.update(&opad[..])?;
  Ok((inner, outer))
}

/// One-shot MAC.
pub fn mac(key: &[u8], data: &[u8]) -> Result<[u8; DIGEST_BYTES], Error> {
  let mut state = Hmac::new(key)?;
  state.update(data)?;
  state.finalize()
}

/// One-shot MAC into a caller buffer of at least 64 bytes.
pub fn mac_into(out: &mut [u8], key: &[u8], data: &[u8]) -> Result<(), Error> {
  let mut state = Hmac::new(key)?;
  state.update(data)?;
  state.finalize_into(out)
}
