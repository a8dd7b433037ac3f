//! AVX2 compression kernel.
//!
//! Packs the four state rows into four 256-bit registers
//! (`row1 = {v0..v3}` .. `row4 = {v12..v15}`). The diagonal step permutes
//! 64-bit lanes within rows 2-4 instead of re-gathering the diagonals.
//! Rotations: 32 via `shuffle_epi32`, 24 via shifts, 16 via a byte
//! shuffle, 63 via shift+or.

#![allow(unsafe_code)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::many_single_char_names)]

use core::arch::x86_64::*;

use super::{BLOCK_BYTES, IV, SIGMA};
use crate::util::load_le64;

const fn mm_shuffle(z: u32, y: u32, x: u32, w: u32) -> i32 {
  ((z << 6) | (y << 4) | (x << 2) | w) as i32
}

#[rustfmt::skip]
static ROT16_MASK: [u8; 32] = [
  2, 3, 4, 5, 6, 7, 0, 1, 10, 11, 12, 13, 14, 15, 8, 9,
  2, 3, 4, 5, 6, 7, 0, 1, 10, 11, 12, 13, 14, 15, 8, 9,
];

#[inline(always)]
unsafe fn loadu(src: *const u64) -> __m256i {
  unsafe { _mm256_loadu_si256(src.cast()) }
}

#[inline(always)]
unsafe fn storeu(v: __m256i, dst: *mut u64) {
  unsafe { _mm256_storeu_si256(dst.cast(), v) }
}

#[inline(always)]
unsafe fn add(a: __m256i, b: __m256i) -> __m256i {
  unsafe { _mm256_add_epi64(a, b) }
}

#[inline(always)]
unsafe fn xor(a: __m256i, b: __m256i) -> __m256i {
  unsafe { _mm256_xor_si256(a, b) }
}

/// Lanes low-to-high: `{a, b, c, d}`.
#[inline(always)]
unsafe fn set4(a: u64, b: u64, c: u64, d: u64) -> __m256i {
  unsafe { _mm256_setr_epi64x(a as i64, b as i64, c as i64, d as i64) }
}

#[inline(always)]
unsafe fn rot32(x: __m256i) -> __m256i {
  unsafe { _mm256_shuffle_epi32::<{ mm_shuffle(2, 3, 0, 1) }>(x) }
}

#[inline(always)]
unsafe fn rot24(x: __m256i) -> __m256i {
  unsafe { _mm256_or_si256(_mm256_srli_epi64::<24>(x), _mm256_slli_epi64::<40>(x)) }
}

#[inline(always)]
unsafe fn rot16(x: __m256i) -> __m256i {
  unsafe {
    let mask = _mm256_loadu_si256(ROT16_MASK.as_ptr().cast());
    _mm256_shuffle_epi8(x, mask)
  }
}

#[inline(always)]
unsafe fn rot63(x: __m256i) -> __m256i {
  unsafe { _mm256_or_si256(_mm256_srli_epi64::<63>(x), _mm256_slli_epi64::<1>(x)) }
}

#[inline(always)]
unsafe fn g(a: &mut __m256i, b: &mut __m256i, c: &mut __m256i, d: &mut __m256i, mx: __m256i, my: __m256i) {
  unsafe {
    *a = add(add(*a, *b), mx);
    *d = rot32(xor(*d, *a));
    *c = add(*c, *d);
    *b = rot24(xor(*b, *c));
    *a = add(add(*a, *b), my);
    *d = rot16(xor(*d, *a));
    *c = add(*c, *d);
    *b = rot63(xor(*b, *c));
  }
}

/// Rotate rows 2-4 so the diagonals line up as columns.
#[inline(always)]
unsafe fn diagonalize(row2: &mut __m256i, row3: &mut __m256i, row4: &mut __m256i) {
  unsafe {
    *row2 = _mm256_permute4x64_epi64::<{ mm_shuffle(0, 3, 2, 1) }>(*row2);
    *row3 = _mm256_permute4x64_epi64::<{ mm_shuffle(1, 0, 3, 2) }>(*row3);
    *row4 = _mm256_permute4x64_epi64::<{ mm_shuffle(2, 1, 0, 3) }>(*row4);
  }
}

#[inline(always)]
unsafe fn undiagonalize(row2: &mut __m256i, row3: &mut __m256i, row4: &mut __m256i) {
  unsafe {
    *row2 = _mm256_permute4x64_epi64::<{ mm_shuffle(2, 1, 0, 3) }>(*row2);
    *row3 = _mm256_permute4x64_epi64::<{ mm_shuffle(1, 0, 3, 2) }>(*row3);
    *row4 = _mm256_permute4x64_epi64::<{ mm_shuffle(0, 3, 2, 1) }>(*row4);
  }
}

#[target_feature(enable = "avx2")]
unsafe fn compress_avx2(h: &mut [u64; 8], block: &[u8; BLOCK_BYTES], t0: u64, t1: u64, last: bool) {
  let mut m = [0u64; 16];
  for (i, chunk) in block.chunks_exact(8).enumerate() {
    m[i] = load_le64(chunk);
  }

  unsafe {
    let mut row1 = loadu(h.as_ptr());
    let mut row2 = loadu(h.as_ptr().add(4));
    let mut row3 = loadu(IV.as_ptr());
    let mut row4 = set4(
      IV[4] ^ t0,
      IV[5] ^ t1,
      if last { IV[6] ^ u64::MAX } else { IV[6] },
      IV[7],
    );

    let orig1 = row1;
    let orig2 = row2;

    for s in &SIGMA {
      let mx = set4(m[s[0]], m[s[2]], m[s[4]], m[s[6]]);
      let my = set4(m[s[1]], m[s[3]], m[s[5]], m[s[7]]);
      g(&mut row1, &mut row2, &mut row3, &mut row4, mx, my);

      diagonalize(&mut row2, &mut row3, &mut row4);
      let mx = set4(m[s[8]], m[s[10]], m[s[12]], m[s[14]]);
      let my = set4(m[s[9]], m[s[11]], m[s[13]], m[s[15]]);
      g(&mut row1, &mut row2, &mut row3, &mut row4, mx, my);
      undiagonalize(&mut row2, &mut row3, &mut row4);
    }

    row1 = xor(xor(row1, row3), orig1);
    row2 = xor(xor(row2, row4), orig2);
    storeu(row1, h.as_mut_ptr());
    storeu(row2, h.as_mut_ptr().add(4));
  }
}

pub(crate) fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_BYTES], t0: u64, t1: u64, last: bool) {
  // SAFETY: the dispatcher and the kernel-test harness only hand out this
  // kernel after verifying AVX2 support.
  unsafe { compress_avx2(h, block, t0, t1, last) }
}
