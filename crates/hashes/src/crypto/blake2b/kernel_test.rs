//! Cross-kernel verification harness.
//!
//! Runs every kernel the current CPU can execute over the same input and
//! checks that they agree. Exposed for integration tests and fuzz targets.

#![allow(clippy::indexing_slicing)] // First-result split in the verify walk

extern crate alloc;

use alloc::vec::Vec;

use super::{
  Blake2b,
  kernels::{ALL, KernelId, compress_fn, required_caps},
};

#[derive(Clone, Debug)]
pub struct KernelResult {
  pub name: &'static str,
  pub digest: [u8; 64],
}

/// A 512-bit hasher pinned to one kernel, bypassing the dispatcher.
fn hasher_for_kernel(id: KernelId) -> Blake2b {
  let mut h = Blake2b::default_512();
  h.compress = compress_fn(id);
  h
}

fn digest_with_kernel(id: KernelId, data: &[u8]) -> [u8; 64] {
  let mut h = hasher_for_kernel(id);
  h.absorb(data);
  h.finalize_raw()
}

/// Hash `data` with every kernel the detected capabilities allow.
#[must_use]
pub fn run_all_kernels(data: &[u8]) -> Vec<KernelResult> {
  let caps = platform::caps();
  let mut out = Vec::with_capacity(ALL.len());
  for &id in ALL {
    if caps.has(required_caps(id)) {
      out.push(KernelResult {
        name: id.as_str(),
        digest: digest_with_kernel(id, data),
      });
    }
  }
  out
}

/// Check that every available kernel produces the same digest for `data`.
pub fn verify_kernels(data: &[u8]) -> Result<(), &'static str> {
  let results = run_all_kernels(data);
  let Some(first) = results.first() else {
    return Ok(());
  };
  for r in &results[1..] {
    if r.digest != first.digest {
      return Err("blake2b kernel mismatch");
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  /// A keyed 512-bit hasher pinned to one kernel.
  ///
  /// Safe to pin after construction: the padded key block is still
  /// buffered, so no compression has happened yet.
  fn keyed_hasher_for_kernel(id: KernelId, key: &[u8]) -> Blake2b {
    let mut h = Blake2b::new_keyed(64, key).unwrap();
    h.compress = compress_fn(id);
    h
  }

  fn pattern(len: usize) -> Vec<u8> {
    (0..len)
      .map(|i| (i as u8).wrapping_mul(31).wrapping_add((i >> 8) as u8))
      .collect()
  }

  const LENS: &[usize] = &[
    0, 1, 2, 3, 63, 64, 65, 127, 128, 129, 255, 256, 257, 1023, 1024, 1025, 10_000,
  ];

  #[test]
  fn all_kernels_match_blake2_oracle_and_streaming_splits() {
    let caps = platform::caps();

    for &id in ALL {
      if !caps.has(required_caps(id)) {
        continue;
      }

      for &len in LENS {
        let msg = pattern(len);
        let ours = digest_with_kernel(id, &msg);

        use blake2::Digest as _;
        let expected = blake2::Blake2b512::digest(&msg);
        let mut exp = [0u8; 64];
        exp.copy_from_slice(&expected);
        assert_eq!(ours, exp, "blake2b oracle mismatch for kernel={}", id.as_str());

        for &chunk in &[1usize, 7, 31, 64, 127, 128, 129, 1024] {
          let mut h = hasher_for_kernel(id);
          for part in msg.chunks(chunk) {
            h.absorb(part);
          }
          assert_eq!(
            h.finalize_raw(),
            ours,
            "blake2b streaming mismatch kernel={} len={len} chunk={chunk}",
            id.as_str(),
          );
        }
      }
    }
  }

  #[test]
  fn all_kernels_agree_on_keyed_hashing() {
    let caps = platform::caps();
    let key: Vec<u8> = (0u8..64).collect();

    for &len in LENS {
      let msg = pattern(len);
      let mut digests = Vec::new();

      for &id in ALL {
        if !caps.has(required_caps(id)) {
          continue;
        }
        let mut h = keyed_hasher_for_kernel(id, &key);
        h.absorb(&msg);
        digests.push((id.as_str(), h.finalize_raw()));
      }

      if let Some((_, first)) = digests.first() {
        for (name, digest) in &digests {
          assert_eq!(digest, first, "keyed kernel mismatch for {name} at len={len}");
        }
      }
    }
  }

  #[test]
  fn verify_kernels_accepts_consistent_state() {
    for &len in &[0usize, 64, 128, 1000] {
      verify_kernels(&pattern(len)).unwrap();
    }
  }
}
