//! BLAKE2b (RFC 7693).
//!
//! Streaming engine with full parameter-block support (digest length, key,
//! salt, personalization), variable output in 1..=64 bytes, and a
//! compression function dispatched at runtime over portable, AVX2, AVX-512
//! and NEON kernels.
//!
//! Sessions zeroize themselves on finalize and on drop; keyed sessions keep
//! their padded key block (also zeroized on drop) so [`Blake2b::reset`] can
//! restore the post-init state.

#![allow(clippy::indexing_slicing)] // Fixed-size block and parameter offsets

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use self::kernels::CompressFn;
use crate::util::{load_le64, store_le32, store_le64};
use traits::Error;

mod dispatch;
pub mod kernel_test;
pub mod kernels;
mod portable;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod avx512;

#[cfg(target_arch = "aarch64")]
mod neon;

pub use dispatch::kernel_name;

/// Compression block size in bytes.
pub const BLOCK_BYTES: usize = 128;
/// Maximum digest length in bytes.
pub const MAX_OUT_BYTES: usize = 64;
/// Maximum key length in bytes.
pub const MAX_KEY_BYTES: usize = 64;
/// Salt length in bytes.
pub const SALT_BYTES: usize = 16;
/// Personalization length in bytes.
pub const PERSONAL_BYTES: usize = 16;

/// Parameter block size in bytes.
const PARAM_BYTES: usize = 64;

pub(crate) const IV: [u64; 8] = [
  0x6a09_e667_f3bc_c908,
  0xbb67_ae85_84ca_a73b,
  0x3c6e_f372_fe94_f82b,
  0xa54f_f53a_5f1d_36f1,
  0x510e_527f_ade6_82d1,
  0x9b05_688c_2b3e_6c1f,
  0x1f83_d9ab_fb41_bd6b,
  0x5be0_cd19_137e_2179,
];

pub(crate) const SIGMA: [[usize; 16]; 12] = [
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
  [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
  [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
  [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
  [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
  [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
  [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
  [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
  [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

// ─────────────────────────────────────────────────────────────────────────────
// Parameter block
// ─────────────────────────────────────────────────────────────────────────────

/// BLAKE2b parameter block builder.
///
/// Two messages hashed with identical bytes but different parameter blocks
/// produce unrelated digests; in particular the digest length participates
/// in the hash, so a 32-byte digest is not a prefix of the 64-byte one.
///
/// Tree-hashing fields (fanout, depth, leaf length, node offset/depth,
/// inner length) are fixed to their sequential-hashing values; a fully
/// custom block can be supplied via [`Blake2b::from_param_block`].
#[derive(Clone, Copy, Debug)]
pub struct Params {
  digest_length: u8,
  key_length: u8,
  salt: [u8; SALT_BYTES],
  personal: [u8; PERSONAL_BYTES],
}

impl Default for Params {
  #[inline]
  fn default() -> Self {
    Self {
      digest_length: MAX_OUT_BYTES as u8,
      key_length: 0,
      salt: [0; SALT_BYTES],
      personal: [0; PERSONAL_BYTES],
    }
  }
}

impl Params {
  /// Create a parameter block for an unkeyed, sequential, 64-byte hash.
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the digest length in bytes.
  ///
  /// # Panics
  ///
  /// Panics if `len` is 0 or greater than 64. Fallible validation lives in
  /// the session constructors ([`Blake2b::new`] and friends).
  #[must_use]
  pub fn digest_length(mut self, len: usize) -> Self {
    assert!((1..=MAX_OUT_BYTES).contains(&len), "digest length must be 1..=64");
    self.digest_length = len as u8;
    self
  }

  /// Set the salt, zero-padded to 16 bytes.
  ///
  /// # Panics
  ///
  /// Panics if `salt` is longer than 16 bytes.
  #[must_use]
  pub fn salt(mut self, salt: &[u8]) -> Self {
    assert!(salt.len() <= SALT_BYTES, "salt must be at most 16 bytes");
    self.salt = [0; SALT_BYTES];
    self.salt[..salt.len()].copy_from_slice(salt);
    self
  }

  /// Set the personalization string, zero-padded to 16 bytes.
  ///
  /// # Panics
  ///
  /// Panics if `personal` is longer than 16 bytes.
  #[must_use]
  pub fn personal(mut self, personal: &[u8]) -> Self {
    assert!(personal.len() <= PERSONAL_BYTES, "personalization must be at most 16 bytes");
    self.personal = [0; PERSONAL_BYTES];
    self.personal[..personal.len()].copy_from_slice(personal);
    self
  }

  #[inline]
  pub(crate) fn key_length(mut self, len: u8) -> Self {
    self.key_length = len;
    self
  }

  /// Serialize to the 64-byte wire layout.
  #[must_use]
  pub fn block(&self) -> [u8; PARAM_BYTES] {
    let mut block = [0u8; PARAM_BYTES];
    block[0] = self.digest_length;
    block[1] = self.key_length;
    block[2] = 1; // fanout
    block[3] = 1; // depth
    store_le32(&mut block[4..], 0); // leaf_length
    store_le64(&mut block[8..], 0); // node_offset
    // 16: node_depth, 17: inner_length, 18..32: reserved, all zero
    block[32..48].copy_from_slice(&self.salt);
    block[48..64].copy_from_slice(&self.personal);
    block
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming engine
// ─────────────────────────────────────────────────────────────────────────────

/// A BLAKE2b hashing session.
///
/// Owned exclusively by the caller; the crate provides no internal
/// synchronization. After [`finalize_into`](Self::finalize_into) the state
/// is zeroized and further `update`/`finalize` calls fail with
/// [`Error::Finalized`]; [`reset`](Self::reset) restores the post-init
/// state from the retained parameter block (and key block, for keyed
/// sessions).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Blake2b {
  h: [u64; 8],
  t: [u64; 2],
  buf: [u8; BLOCK_BYTES],
  buflen: usize,
  outlen: usize,
  param: [u8; PARAM_BYTES],
  key_block: [u8; BLOCK_BYTES],
  keyed: bool,
  finalized: bool,
  #[zeroize(skip)]
  compress: CompressFn,
}

impl Blake2b {
  /// Create an unkeyed session with the given digest length (1..=64).
  pub fn new(outlen: usize) -> Result<Self, Error> {
    if outlen == 0 || outlen > MAX_OUT_BYTES {
      return Err(Error::InvalidDigestLength);
    }
    Ok(Self::from_block(Params::new().digest_length(outlen).block()))
  }

  /// Create a keyed session (RFC 7693 keyed hashing).
  ///
  /// The key (1..=64 bytes) is zero-padded to one 128-byte block and
  /// absorbed through the ordinary update path, so a keyed hash of the
  /// empty message compresses the key block as the final block.
  pub fn new_keyed(outlen: usize, key: &[u8]) -> Result<Self, Error> {
    if outlen == 0 || outlen > MAX_OUT_BYTES {
      return Err(Error::InvalidDigestLength);
    }
    if key.is_empty() || key.len() > MAX_KEY_BYTES {
      return Err(Error::InvalidKeyLength);
    }

    let block = Params::new()
      .digest_length(outlen)
      .key_length(key.len() as u8)
      .block();
    let mut s = Self::from_block(block);
    s.keyed = true;
    s.key_block[..key.len()].copy_from_slice(key);
    s.absorb_key_block();
    Ok(s)
  }

  /// Create a session from a [`Params`] builder.
  pub fn with_params(params: &Params) -> Result<Self, Error> {
    Self::from_param_block(&params.block())
  }

  /// Create a session from a caller-supplied 64-byte parameter block,
  /// consumed verbatim.
  ///
  /// Rejects blocks whose digest length (byte 0) is 0 or greater than 64.
  pub fn from_param_block(block: &[u8; PARAM_BYTES]) -> Result<Self, Error> {
    if block[0] == 0 || block[0] as usize > MAX_OUT_BYTES {
      return Err(Error::InvalidParameterBlock);
    }
    Ok(Self::from_block(*block))
  }

  /// Infallible constructor for an already-validated parameter block.
  fn from_block(param: [u8; PARAM_BYTES]) -> Self {
    let mut s = Self {
      h: [0; 8],
      t: [0; 2],
      buf: [0; BLOCK_BYTES],
      buflen: 0,
      outlen: 0,
      param,
      key_block: [0; BLOCK_BYTES],
      keyed: false,
      finalized: false,
      compress: dispatch::active_compress(),
    };
    s.init_state();
    s
  }

  /// Default BLAKE2b-512 session, used by [`Blake2b512`] and HMAC.
  pub(crate) fn default_512() -> Self {
    Self::from_block(Params::new().block())
  }

  /// (Re)derive the chaining value from the stored parameter block.
  fn init_state(&mut self) {
    for (i, h) in self.h.iter_mut().enumerate() {
      *h = IV[i] ^ load_le64(&self.param[i * 8..]);
    }
    self.t = [0; 2];
    self.buf = [0; BLOCK_BYTES];
    self.buflen = 0;
    self.outlen = self.param[0] as usize;
    self.finalized = false;
  }

  /// Feed the retained zero-padded key block through the update path.
  fn absorb_key_block(&mut self) {
    let kb = Zeroizing::new(self.key_block);
    self.absorb(&kb[..]);
  }

  /// The digest length recorded at init.
  #[inline]
  #[must_use]
  pub fn outlen(&self) -> usize {
    self.outlen
  }

  /// Advance the 128-bit byte counter.
  #[inline]
  fn increment_t(&mut self, delta: u64) {
    self.t[0] = self.t[0].wrapping_add(delta);
    if self.t[0] < delta {
      self.t[1] = self.t[1].wrapping_add(1);
    }
  }

  /// Append bytes to the stream.
  ///
  /// Fails with [`Error::Finalized`] after `finalize_into`, and with
  /// [`Error::Backend`] if the buffer length invariant is violated
  /// (corruption check).
  pub fn update(&mut self, data: &[u8]) -> Result<(), Error> {
    if self.finalized {
      return Err(Error::Finalized);
    }
    if self.buflen > BLOCK_BYTES {
      return Err(Error::Backend);
    }
    self.absorb(data);
    Ok(())
  }

  /// Infallible absorb over a live state.
  ///
  /// The final block must always be compressed with the `last` flag, so a
  /// buffered full block is held back until more input proves it is not the
  /// last one, and the direct path never compresses the trailing full block
  /// of `data`.
  fn absorb(&mut self, mut data: &[u8]) {
    if data.is_empty() {
      return;
    }

    if self.buflen > 0 {
      let left = BLOCK_BYTES - self.buflen;
      if data.len() > left {
        self.buf[self.buflen..].copy_from_slice(&data[..left]);
        self.increment_t(BLOCK_BYTES as u64);
        (self.compress)(&mut self.h, &self.buf, self.t[0], self.t[1], false);
        self.buflen = 0;
        data = &data[left..];
      } else {
        self.buf[self.buflen..self.buflen + data.len()].copy_from_slice(data);
        self.buflen += data.len();
        return;
      }
    }

    let (blocks, rest) = data.as_chunks::<BLOCK_BYTES>();
    if !blocks.is_empty() {
      let (to_compress, last_full) = if rest.is_empty() {
        (&blocks[..blocks.len() - 1], Some(&blocks[blocks.len() - 1]))
      } else {
        (blocks, None)
      };

      for block in to_compress {
        self.increment_t(BLOCK_BYTES as u64);
        (self.compress)(&mut self.h, block, self.t[0], self.t[1], false);
      }

      if let Some(last) = last_full {
        self.buf.copy_from_slice(last);
        self.buflen = BLOCK_BYTES;
      }
    }

    if !rest.is_empty() {
      self.buf[..rest.len()].copy_from_slice(rest);
      self.buflen = rest.len();
    }
  }

  /// Finalize the stream into `out`.
  ///
  /// Requires `out.len() >= self.outlen()`; exactly `outlen` bytes are
  /// written. The intermediate digest buffer and the hashing state are
  /// zeroized before returning, and the session is marked finalized.
  pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<(), Error> {
    if self.finalized {
      return Err(Error::Finalized);
    }
    if out.len() < self.outlen {
      return Err(Error::BufferTooSmall);
    }
    if self.buflen > BLOCK_BYTES {
      return Err(Error::Backend);
    }

    let digest = Zeroizing::new(self.finalize_raw());
    out[..self.outlen].copy_from_slice(&digest[..self.outlen]);
    Ok(())
  }

  /// Compress the final block and serialize the chaining value.
  ///
  /// Zeroizes the hashing state and marks the session finalized; callers
  /// own the returned buffer (the first `outlen` bytes are the digest).
  pub(crate) fn finalize_raw(&mut self) -> [u8; MAX_OUT_BYTES] {
    self.increment_t(self.buflen as u64);
    self.buf[self.buflen..].fill(0);
    (self.compress)(&mut self.h, &self.buf, self.t[0], self.t[1], true);

    let mut digest = [0u8; MAX_OUT_BYTES];
    for (i, word) in self.h.iter().enumerate() {
      store_le64(&mut digest[i * 8..], *word);
    }

    self.h.zeroize();
    self.t.zeroize();
    self.buf.zeroize();
    self.buflen = 0;
    self.finalized = true;

    digest
  }

  /// Restore the initial post-init state.
  ///
  /// Reapplies the parameter block and, for keyed sessions, re-feeds the
  /// retained padded key block. Valid on finalized sessions.
  pub fn reset(&mut self) {
    self.init_state();
    if self.keyed {
      self.absorb_key_block();
    }
  }
}

impl core::fmt::Debug for Blake2b {
  /// Redacted: never prints the chaining value, buffer, or key block.
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Blake2b")
      .field("outlen", &self.outlen)
      .field("keyed", &self.keyed)
      .field("finalized", &self.finalized)
      .finish_non_exhaustive()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helpers
// ─────────────────────────────────────────────────────────────────────────────

/// One-shot unkeyed hash; the digest length is `out.len()` (1..=64).
pub fn hash_into(out: &mut [u8], data: &[u8]) -> Result<(), Error> {
  let mut h = Blake2b::new(out.len())?;
  h.update(data)?;
  h.finalize_into(out)
}

/// One-shot keyed hash; the digest length is `out.len()` (1..=64).
pub fn keyed_hash_into(out: &mut [u8], key: &[u8], data: &[u8]) -> Result<(), Error> {
  let mut h = Blake2b::new_keyed(out.len(), key)?;
  h.update(data)?;
  h.finalize_into(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed 512-bit convenience hasher
// ─────────────────────────────────────────────────────────────────────────────

/// BLAKE2b-512: unkeyed, 64-byte output.
#[derive(Clone)]
pub struct Blake2b512 {
  inner: Blake2b,
}

impl Default for Blake2b512 {
  #[inline]
  fn default() -> Self {
    Self {
      inner: Blake2b::default_512(),
    }
  }
}

impl traits::Digest for Blake2b512 {
  const OUTPUT_SIZE: usize = MAX_OUT_BYTES;
  type Output = [u8; MAX_OUT_BYTES];

  #[inline]
  fn new() -> Self {
    Self::default()
  }

  #[inline]
  fn update(&mut self, data: &[u8]) {
    self.inner.absorb(data);
  }

  fn finalize(&self) -> Self::Output {
    let mut state = self.inner.clone();
    state.finalize_raw()
  }

  #[inline]
  fn reset(&mut self) {
    self.inner.reset();
  }
}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::vec::Vec;

  use traits::Digest as _;

  use super::*;

  #[test]
  fn rejects_out_of_range_digest_lengths() {
    assert_eq!(Blake2b::new(0).unwrap_err(), Error::InvalidDigestLength);
    assert_eq!(Blake2b::new(65).unwrap_err(), Error::InvalidDigestLength);
    assert!(Blake2b::new(1).is_ok());
    assert!(Blake2b::new(64).is_ok());
  }

  #[test]
  fn rejects_bad_keys() {
    assert_eq!(Blake2b::new_keyed(64, &[]).unwrap_err(), Error::InvalidKeyLength);
    assert_eq!(Blake2b::new_keyed(64, &[0u8; 65]).unwrap_err(), Error::InvalidKeyLength);
    assert!(Blake2b::new_keyed(64, &[0u8; 64]).is_ok());
  }

  #[test]
  fn rejects_bad_param_blocks() {
    let mut block = Params::new().block();
    block[0] = 0;
    assert_eq!(Blake2b::from_param_block(&block).unwrap_err(), Error::InvalidParameterBlock);
    block[0] = 65;
    assert_eq!(Blake2b::from_param_block(&block).unwrap_err(), Error::InvalidParameterBlock);
    block[0] = 64;
    assert!(Blake2b::from_param_block(&block).is_ok());
  }

  #[test]
  fn param_block_layout() {
    let block = Params::new()
      .digest_length(32)
      .salt(b"salt")
      .personal(b"personal")
      .block();
    assert_eq!(block[0], 32);
    assert_eq!(block[1], 0);
    assert_eq!(block[2], 1);
    assert_eq!(block[3], 1);
    assert_eq!(&block[4..32], &[0u8; 28]);
    assert_eq!(&block[32..36], b"salt");
    assert_eq!(&block[36..48], &[0u8; 12]);
    assert_eq!(&block[48..56], b"personal");
    assert_eq!(&block[56..64], &[0u8; 8]);
  }

  #[test]
  fn counter_carries_into_high_word() {
    let mut h = Blake2b::default_512();
    h.t = [u64::MAX - 100, 0];
    h.increment_t(128);
    assert_eq!(h.t[1], 1);
    assert_eq!(h.t[0], 27);

    let mut h2 = Blake2b::default_512();
    h2.t = [u64::MAX, 0];
    h2.increment_t(0);
    assert_eq!(h2.t, [u64::MAX, 0]);
  }

  #[test]
  fn state_is_zeroized_after_finalize() {
    let mut h = Blake2b::new(64).unwrap();
    h.update(b"some data worth erasing").unwrap();
    let mut out = [0u8; 64];
    h.finalize_into(&mut out).unwrap();

    assert_eq!(h.h, [0u64; 8]);
    assert_eq!(h.t, [0u64; 2]);
    assert_eq!(h.buf, [0u8; BLOCK_BYTES]);
    assert_eq!(h.buflen, 0);
    assert!(h.finalized);
  }

  #[test]
  fn update_and_finalize_fail_after_finalize() {
    let mut h = Blake2b::new(32).unwrap();
    let mut out = [0u8; 32];
    h.finalize_into(&mut out).unwrap();
    assert_eq!(h.update(b"more").unwrap_err(), Error::Finalized);
    assert_eq!(h.finalize_into(&mut out).unwrap_err(), Error::Finalized);
  }

  #[test]
  fn finalize_rejects_short_output() {
    let mut h = Blake2b::new(64).unwrap();
    let mut short = [0u8; 32];
    assert_eq!(h.finalize_into(&mut short).unwrap_err(), Error::BufferTooSmall);
    // Validation failures leave the session usable.
    let mut out = [0u8; 64];
    h.finalize_into(&mut out).unwrap();
  }

  #[test]
  fn reset_restores_initial_state() {
    let mut h = Blake2b::new(64).unwrap();
    let mut first = [0u8; 64];
    h.update(b"abc").unwrap();
    h.finalize_into(&mut first).unwrap();

    h.reset();
    let mut second = [0u8; 64];
    h.update(b"abc").unwrap();
    h.finalize_into(&mut second).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn keyed_reset_restores_key_block() {
    let key: Vec<u8> = (0u8..32).collect();
    let mut h = Blake2b::new_keyed(64, &key).unwrap();
    h.update(b"message").unwrap();
    let mut first = [0u8; 64];
    h.finalize_into(&mut first).unwrap();

    h.reset();
    h.update(b"message").unwrap();
    let mut second = [0u8; 64];
    h.finalize_into(&mut second).unwrap();
    assert_eq!(first, second);

    let mut fresh = Blake2b::new_keyed(64, &key).unwrap();
    fresh.update(b"message").unwrap();
    let mut third = [0u8; 64];
    fresh.finalize_into(&mut third).unwrap();
    assert_eq!(first, third);
  }

  #[test]
  fn zero_length_update_is_a_no_op() {
    let mut a = Blake2b::new(64).unwrap();
    a.update(&[]).unwrap();
    a.update(b"xyz").unwrap();
    a.update(&[]).unwrap();
    let mut left = [0u8; 64];
    a.finalize_into(&mut left).unwrap();

    let mut right = [0u8; 64];
    hash_into(&mut right, b"xyz").unwrap();
    assert_eq!(left, right);
  }

  #[test]
  fn blake2b512_digest_trait_round_trip() {
    let one_shot = Blake2b512::digest(b"abc");
    let mut h = Blake2b512::new();
    h.update(b"a");
    h.update(b"bc");
    assert_eq!(h.finalize(), one_shot);

    // Non-consuming finalize: the hasher stays usable.
    h.update(b"d");
    assert_ne!(h.finalize(), one_shot);

    h.reset();
    h.update(b"abc");
    assert_eq!(h.finalize(), one_shot);
  }

  #[test]
  fn one_shot_matches_streaming_across_block_boundaries() {
    let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    for split in [0usize, 1, 63, 64, 127, 128, 129, 255, 256, 999, 1000] {
      let mut streamed = Blake2b::new(64).unwrap();
      streamed.update(&data[..split]).unwrap();
      streamed.update(&data[split..]).unwrap();
      let mut left = [0u8; 64];
      streamed.finalize_into(&mut left).unwrap();

      let mut right = [0u8; 64];
      hash_into(&mut right, &data).unwrap();
      assert_eq!(left, right, "split at {split}");
    }
  }
}
