//! NEON compression kernel (AArch64).
//!
//! Each state row spans two 128-bit registers (two 64-bit lanes per
//! register). Rotations: 32 via `vrev64q_u32`, 24 and 16 via `vqtbl1q_u8`
//! byte tables, 63 via shift-left-insert (`vsli`, two ops instead of
//! three). Diagonalization shuffles lane pairs with `vextq_u64` and swaps
//! the row-3 registers.

#![allow(unsafe_code)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::too_many_arguments)]

use core::arch::aarch64::*;

use super::{BLOCK_BYTES, IV, SIGMA};
use crate::util::load_le64;

static ROT16_TBL: [u8; 16] = [2, 3, 4, 5, 6, 7, 0, 1, 10, 11, 12, 13, 14, 15, 8, 9];
static ROT24_TBL: [u8; 16] = [3, 4, 5, 6, 7, 0, 1, 2, 11, 12, 13, 14, 15, 8, 9, 10];

#[inline(always)]
unsafe fn pair(lo: u64, hi: u64) -> uint64x2_t {
  unsafe { vcombine_u64(vcreate_u64(lo), vcreate_u64(hi)) }
}

#[inline(always)]
unsafe fn add(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
  unsafe { vaddq_u64(a, b) }
}

#[inline(always)]
unsafe fn xor(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
  unsafe { veorq_u64(a, b) }
}

#[inline(always)]
unsafe fn rot32(x: uint64x2_t) -> uint64x2_t {
  unsafe { vreinterpretq_u64_u32(vrev64q_u32(vreinterpretq_u32_u64(x))) }
}

#[inline(always)]
unsafe fn rot_tbl(x: uint64x2_t, tbl: uint8x16_t) -> uint64x2_t {
  unsafe { vreinterpretq_u64_u8(vqtbl1q_u8(vreinterpretq_u8_u64(x), tbl)) }
}

#[inline(always)]
unsafe fn rot63(x: uint64x2_t) -> uint64x2_t {
  unsafe { vsliq_n_u64::<1>(vshrq_n_u64::<63>(x), x) }
}

#[inline(always)]
unsafe fn g(
  a: &mut uint64x2_t,
  b: &mut uint64x2_t,
  c: &mut uint64x2_t,
  d: &mut uint64x2_t,
  mx: uint64x2_t,
  my: uint64x2_t,
  rot16_tbl: uint8x16_t,
  rot24_tbl: uint8x16_t,
) {
  unsafe {
    *a = add(add(*a, *b), mx);
    *d = rot32(xor(*d, *a));
    *c = add(*c, *d);
    *b = rot_tbl(xor(*b, *c), rot24_tbl);
    *a = add(add(*a, *b), my);
    *d = rot_tbl(xor(*d, *a), rot16_tbl);
    *c = add(*c, *d);
    *b = rot63(xor(*b, *c));
  }
}

#[target_feature(enable = "neon")]
unsafe fn compress_neon(h: &mut [u64; 8], block: &[u8; BLOCK_BYTES], t0: u64, t1: u64, last: bool) {
  let mut m = [0u64; 16];
  for (i, chunk) in block.chunks_exact(8).enumerate() {
    m[i] = load_le64(chunk);
  }

  unsafe {
    let rot16_tbl = vld1q_u8(ROT16_TBL.as_ptr());
    let rot24_tbl = vld1q_u8(ROT24_TBL.as_ptr());

    let mut row1a = vld1q_u64(h.as_ptr()); // v0, v1
    let mut row1b = vld1q_u64(h.as_ptr().add(2)); // v2, v3
    let mut row2a = vld1q_u64(h.as_ptr().add(4)); // v4, v5
    let mut row2b = vld1q_u64(h.as_ptr().add(6)); // v6, v7

    let mut row3a = vld1q_u64(IV.as_ptr()); // v8, v9
    let mut row3b = vld1q_u64(IV.as_ptr().add(2)); // v10, v11

    let mut row4a = xor(pair(IV[4], IV[5]), pair(t0, t1));
    let mut row4b = pair(if last { IV[6] ^ u64::MAX } else { IV[6] }, IV[7]);

    let orig1a = row1a;
    let orig1b = row1b;
    let orig2a = row2a;
    let orig2b = row2b;

    for s in &SIGMA {
      // Column step
      {
        let mx = pair(m[s[0]], m[s[2]]);
        let my = pair(m[s[1]], m[s[3]]);
        g(&mut row1a, &mut row2a, &mut row3a, &mut row4a, mx, my, rot16_tbl, rot24_tbl);
      }
      {
        let mx = pair(m[s[4]], m[s[6]]);
        let my = pair(m[s[5]], m[s[7]]);
        g(&mut row1b, &mut row2b, &mut row3b, &mut row4b, mx, my, rot16_tbl, rot24_tbl);
      }

      // Diagonalize
      {
        let t2a = vextq_u64::<1>(row2a, row2b);
        let t2b = vextq_u64::<1>(row2b, row2a);
        row2a = t2a;
        row2b = t2b;

        core::mem::swap(&mut row3a, &mut row3b);

        let t4a = vextq_u64::<1>(row4b, row4a);
        let t4b = vextq_u64::<1>(row4a, row4b);
        row4a = t4a;
        row4b = t4b;
      }

      // Diagonal step
      {
        let mx = pair(m[s[8]], m[s[10]]);
        let my = pair(m[s[9]], m[s[11]]);
        g(&mut row1a, &mut row2a, &mut row3a, &mut row4a, mx, my, rot16_tbl, rot24_tbl);
      }
      {
        let mx = pair(m[s[12]], m[s[14]]);
        let my = pair(m[s[13]], m[s[15]]);
        g(&mut row1b, &mut row2b, &mut row3b, &mut row4b, mx, my, rot16_tbl, rot24_tbl);
      }

      // Undiagonalize
      {
        let t2a = vextq_u64::<1>(row2b, row2a);
        let t2b = vextq_u64::<1>(row2a, row2b);
        row2a = t2a;
        row2b = t2b;

        core::mem::swap(&mut row3a, &mut row3b);

        let t4a = vextq_u64::<1>(row4a, row4b);
        let t4b = vextq_u64::<1>(row4b, row4a);
        row4a = t4a;
        row4b = t4b;
      }
    }

    row1a = xor(xor(row1a, row3a), orig1a);
    row1b = xor(xor(row1b, row3b), orig1b);
    row2a = xor(xor(row2a, row4a), orig2a);
    row2b = xor(xor(row2b, row4b), orig2b);

    vst1q_u64(h.as_mut_ptr(), row1a);
    vst1q_u64(h.as_mut_ptr().add(2), row1b);
    vst1q_u64(h.as_mut_ptr().add(4), row2a);
    vst1q_u64(h.as_mut_ptr().add(6), row2b);
  }
}

pub(crate) fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_BYTES], t0: u64, t1: u64, last: bool) {
  // SAFETY: NEON is architecturally guaranteed on AArch64, and the
  // dispatcher additionally checks the capability bit.
  unsafe { compress_neon(h, block, t0, t1, last) }
}
