//! Compression kernel registry.
//!
//! Every kernel implements the same pure contract
//! `F(h, block, t0, t1, last)` with identical observable behavior; which
//! one runs is decided once per process by [`super::dispatch`]. Kernel ids
//! exist on every target: an id whose vector extension is not compiled for
//! the current architecture maps to the portable kernel.

use platform::Caps;

use super::BLOCK_BYTES;

pub(crate) type CompressFn = fn(&mut [u64; 8], &[u8; BLOCK_BYTES], u64, u64, bool);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelId {
  Portable = 0,
  Avx2 = 1,
  Avx512 = 2,
  Neon = 3,
}

pub const ALL: &[KernelId] = &[KernelId::Portable, KernelId::Avx2, KernelId::Avx512, KernelId::Neon];

impl KernelId {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Portable => "portable",
      Self::Avx2 => "avx2",
      Self::Avx512 => "avx512",
      Self::Neon => "neon",
    }
  }
}

#[must_use]
pub(crate) fn compress_fn(id: KernelId) -> CompressFn {
  match id {
    KernelId::Portable => super::portable::compress,
    KernelId::Avx2 => {
      #[cfg(target_arch = "x86_64")]
      {
        super::avx2::compress
      }
      #[cfg(not(target_arch = "x86_64"))]
      {
        super::portable::compress
      }
    }
    KernelId::Avx512 => {
      #[cfg(target_arch = "x86_64")]
      {
        super::avx512::compress
      }
      #[cfg(not(target_arch = "x86_64"))]
      {
        super::portable::compress
      }
    }
    KernelId::Neon => {
      #[cfg(target_arch = "aarch64")]
      {
        super::neon::compress
      }
      #[cfg(not(target_arch = "aarch64"))]
      {
        super::portable::compress
      }
    }
  }
}

/// Capabilities a kernel needs before it may be selected or exercised.
#[inline]
#[must_use]
pub const fn required_caps(id: KernelId) -> Caps {
  match id {
    KernelId::Portable => Caps::NONE,
    KernelId::Avx2 => platform::caps::x86::AVX2,
    KernelId::Avx512 => platform::caps::x86::AVX512_READY,
    KernelId::Neon => platform::caps::aarch64::NEON,
  }
}
